//! Integration tests for the ledger-derived stock views and dashboard.
//!
//! Tests cover:
//! - Manual adjustments and their normalization
//! - Category summary and detailed stock across lifecycle operations
//! - DOA bin exclusion
//! - Known categories, SKU listing and the recent-activity view
//! - Dashboard counts and average cycle time

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestApp;
use sea_orm::{ActiveModelTrait, Set};
use swaptrack_api::entities::swap_request::{self, DoaFlag, SwapStatus};
use swaptrack_api::entities::LogType;
use swaptrack_api::errors::ServiceError;
use swaptrack_api::services::inventory::ManualAdjustment;
use swaptrack_api::services::swaps::{DispatchDetails, NewSwapRequest, ReceiptDetails};
use uuid::Uuid;

fn adjustment(sku: &str, quantity: i32, bin: Option<&str>, acronym: Option<&str>) -> ManualAdjustment {
    ManualAdjustment {
        part_sku: sku.to_string(),
        quantity,
        bin: bin.map(str::to_string),
        part_acronym: acronym.map(str::to_string),
        notes: String::new(),
    }
}

async fn pause() {
    // Keeps occurred_at strictly increasing for order-sensitive assertions.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

// ==================== Manual adjustments ====================

#[tokio::test]
async fn manual_adjustment_normalizes_and_defaults() {
    let app = TestApp::new().await;

    let entry = app
        .inventory()
        .manual_adjustment(
            ManualAdjustment {
                part_sku: "  bt-4cell ".to_string(),
                quantity: 3,
                bin: None,
                part_acronym: Some(" bt ".to_string()),
                notes: "found extra units during audit".to_string(),
            },
            "casey",
        )
        .await
        .expect("record manual adjustment");

    assert_eq!(entry.log_type, LogType::ManualAdjustment);
    assert_eq!(entry.part_sku, "bt-4cell");
    assert_eq!(entry.bin, "ADJUSTMENT_BIN", "blank bin takes the default");
    assert_eq!(entry.part_acronym.as_deref(), Some("BT"));
    assert_eq!(
        entry.notes,
        "Manual Adjustment: found extra units during audit (by casey)"
    );
    assert_eq!(entry.related_request_id, None);
}

#[tokio::test]
async fn manual_adjustment_rejects_zero_quantity() {
    let app = TestApp::new().await;

    let result = app
        .inventory()
        .manual_adjustment(adjustment("BT-01", 0, None, None), "casey")
        .await;

    assert_matches!(result, Err(ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn manual_adjustment_requires_a_sku() {
    let app = TestApp::new().await;

    let result = app
        .inventory()
        .manual_adjustment(adjustment("   ", 2, None, None), "casey")
        .await;

    assert_matches!(result, Err(ServiceError::InvalidInput(_)));
}

// ==================== Stock views across the lifecycle ====================

#[tokio::test]
async fn stock_views_track_dispatch_and_receipt() {
    let app = TestApp::new().await;

    app.inventory()
        .manual_adjustment(
            adjustment("LCD156-WXGA", 5, Some("SHELF-A1"), Some("LCD")),
            "casey",
        )
        .await
        .unwrap();

    let summary = app.inventory().category_summary().await.unwrap();
    assert_eq!(summary.get("LCD"), Some(&5));

    let swap = app
        .swaps()
        .create_swap(NewSwapRequest {
            ticket: "WO-100".to_string(),
            part_abbreviation: "LCD".to_string(),
            serial_num: "SN-1".to_string(),
            oem_claim_num: None,
        })
        .await
        .unwrap();
    pause().await;
    app.swaps()
        .dispatch_swap(
            swap.id,
            DispatchDetails {
                stock_part_used_sku: "LCD156-WXGA".to_string(),
                stock_bin: "SHELF-A1".to_string(),
                dispatch_doa: false,
                inven_adjust: None,
            },
            "alex",
        )
        .await
        .unwrap();

    let summary = app.inventory().category_summary().await.unwrap();
    assert_eq!(summary.get("LCD"), Some(&4), "dispatch deducts one unit");

    let detail = app.inventory().detailed_stock().await.unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0].sku, "LCD156-WXGA");
    assert_eq!(detail[0].bin, "SHELF-A1");
    assert_eq!(detail[0].quantity, 4);
    assert_eq!(detail[0].category.as_deref(), Some("LCD"));

    pause().await;
    app.swaps()
        .receive_swap(
            swap.id,
            ReceiptDetails {
                received_part_sku: "LCD156-WXGA-R".to_string(),
                received_ppid: "PPID-5".to_string(),
                received_qty: 1,
                received_bin: "SHELF-R1".to_string(),
                received_doa: false,
            },
            "sam",
        )
        .await
        .unwrap();

    // The returned part carries the swap's category through the link.
    let summary = app.inventory().category_summary().await.unwrap();
    assert_eq!(summary.get("LCD"), Some(&5));

    let detail = app.inventory().detailed_stock().await.unwrap();
    assert_eq!(detail.len(), 2);
    let returned = detail
        .iter()
        .find(|row| row.sku == "LCD156-WXGA-R")
        .expect("returned part row");
    assert_eq!(returned.bin, "SHELF-R1");
    assert_eq!(returned.quantity, 1);
    assert_eq!(returned.category.as_deref(), Some("LCD"));
}

#[tokio::test]
async fn doa_bins_hold_no_usable_stock() {
    let app = TestApp::new().await;

    app.inventory()
        .manual_adjustment(
            adjustment("HT-500", 3, Some("RMA/DOA-SHELF"), Some("HT")),
            "casey",
        )
        .await
        .unwrap();

    assert!(app.inventory().category_summary().await.unwrap().is_empty());
    assert!(app.inventory().detailed_stock().await.unwrap().is_empty());

    // The entries still exist in the audit trail and SKU listing.
    assert_eq!(app.inventory().list_skus().await.unwrap(), vec!["HT-500"]);
    assert_eq!(app.inventory().recent_entries(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn detailed_stock_sorts_rows() {
    let app = TestApp::new().await;

    app.inventory()
        .manual_adjustment(adjustment("Z-SKU", 1, Some("B2"), Some("BT")), "casey")
        .await
        .unwrap();
    pause().await;
    app.inventory()
        .manual_adjustment(adjustment("A-SKU", 1, Some("B1"), Some("BT")), "casey")
        .await
        .unwrap();
    pause().await;
    app.inventory()
        .manual_adjustment(adjustment("A-SKU", 1, Some("B2"), Some("BC")), "casey")
        .await
        .unwrap();

    let detail = app.inventory().detailed_stock().await.unwrap();
    let keys: Vec<(Option<&str>, &str, &str)> = detail
        .iter()
        .map(|row| (row.category.as_deref(), row.sku.as_str(), row.bin.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (Some("BC"), "A-SKU", "B2"),
            (Some("BT"), "A-SKU", "B1"),
            (Some("BT"), "Z-SKU", "B2"),
        ]
    );
}

// ==================== Categories, SKUs and recent activity ====================

#[tokio::test]
async fn known_categories_merge_seeds_swaps_and_recordings() {
    let app = TestApp::new().await;

    app.swaps()
        .create_swap(NewSwapRequest {
            ticket: "WO-200".to_string(),
            part_abbreviation: "OLED".to_string(),
            serial_num: "SN-2".to_string(),
            oem_claim_num: None,
        })
        .await
        .unwrap();
    app.inventory()
        .manual_adjustment(adjustment("CAM-01", 1, None, Some("CAM")), "casey")
        .await
        .unwrap();

    let known = app.inventory().known_categories().await.unwrap();
    for expected in ["BC", "BT", "HT", "KBB", "LCD", "LCD-BC", "LCDC", "OLED", "CAM"] {
        assert!(
            known.contains(&expected.to_string()),
            "known categories should include {expected}, got {known:?}"
        );
    }
    let mut sorted = known.clone();
    sorted.sort();
    assert_eq!(known, sorted, "categories come back sorted");
}

#[tokio::test]
async fn list_skus_deduplicates_and_sorts() {
    let app = TestApp::new().await;

    app.inventory()
        .manual_adjustment(adjustment("BT-01", 2, None, None), "casey")
        .await
        .unwrap();
    app.inventory()
        .manual_adjustment(adjustment("BT-01", -1, None, None), "casey")
        .await
        .unwrap();
    app.inventory()
        .manual_adjustment(adjustment("AC-90W", 4, None, None), "casey")
        .await
        .unwrap();

    let skus = app.inventory().list_skus().await.unwrap();
    assert_eq!(skus, vec!["AC-90W", "BT-01"]);
}

#[tokio::test]
async fn recent_entries_cap_and_order_newest_first() {
    let app = TestApp::new().await;

    for sku in ["FIRST", "SECOND", "THIRD"] {
        app.inventory()
            .manual_adjustment(adjustment(sku, 1, None, None), "casey")
            .await
            .unwrap();
        pause().await;
    }

    let recent = app.inventory().recent_entries(Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].part_sku, "THIRD");
    assert_eq!(recent[1].part_sku, "SECOND");

    let all = app.inventory().recent_entries(None).await.unwrap();
    assert_eq!(all.len(), 3, "default limit accommodates the whole trail");
}

// ==================== Dashboard ====================

#[tokio::test]
async fn dashboard_reflects_queue_and_stock() {
    let app = TestApp::new().await;

    app.inventory()
        .manual_adjustment(adjustment("BT-X", 4, Some("B1"), Some("BT")), "casey")
        .await
        .unwrap();

    let mut made = Vec::new();
    for ticket in ["WO-300", "WO-301", "WO-302"] {
        made.push(
            app.swaps()
                .create_swap(NewSwapRequest {
                    ticket: ticket.to_string(),
                    part_abbreviation: "LCD".to_string(),
                    serial_num: "SN-3".to_string(),
                    oem_claim_num: None,
                })
                .await
                .unwrap(),
        );
    }
    app.swaps()
        .dispatch_swap(
            made[0].id,
            DispatchDetails {
                stock_part_used_sku: "LCD-15".to_string(),
                stock_bin: "A1".to_string(),
                dispatch_doa: false,
                inven_adjust: None,
            },
            "alex",
        )
        .await
        .unwrap();

    let metrics = app.dashboard().get_dashboard_metrics().await.unwrap();
    assert_eq!(metrics.pending_dispatch_count, 2);
    assert_eq!(metrics.pending_receipt_count, 1);
    assert_eq!(metrics.completed_count, 0);
    assert_eq!(metrics.total_pending, 3);
    assert_eq!(metrics.avg_days_to_complete, "N/A");
    // LCD stock went negative from the dispatch, so only BT survives.
    assert_eq!(metrics.part_stock_summary.get("BT"), Some(&4));
    assert_eq!(metrics.part_stock_summary.get("LCD"), None);
}

#[tokio::test]
async fn dashboard_average_covers_completed_swaps_only() {
    let app = TestApp::new().await;

    insert_completed_swap(&app, "WO-400", 3).await;
    insert_completed_swap(&app, "WO-401", 1).await;

    // A reopened swap keeps its timestamps but is back in the queue; it must
    // not contribute to the average.
    let dispatched = Utc::now() - Duration::days(30);
    swap_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket: Set("WO-402".to_string()),
        part_abbreviation: Set("LCD".to_string()),
        serial_num: Set("SN-4".to_string()),
        oem_claim_num: Set(None),
        date_requested: Set(dispatched - Duration::days(1)),
        status: Set(SwapStatus::PendingDispatch),
        stock_part_used_sku: Set(Some("LCD-15".to_string())),
        stock_bin: Set(Some("A1".to_string())),
        dispatch_doa: Set(DoaFlag::No),
        inven_adjust: Set(None),
        date_dispatched: Set(Some(dispatched)),
        received_part_sku: Set(Some("LCD-15-R".to_string())),
        received_ppid: Set(Some("PPID-9".to_string())),
        received_qty: Set(Some(1)),
        received_bin: Set(Some("R1".to_string())),
        received_doa: Set(DoaFlag::YesPostInstall),
        date_replenished: Set(Some(dispatched + Duration::days(10))),
        version: Set(4),
    }
    .insert(app.db())
    .await
    .expect("insert reopened swap");

    let metrics = app.dashboard().get_dashboard_metrics().await.unwrap();
    assert_eq!(metrics.completed_count, 2);
    assert_eq!(metrics.pending_dispatch_count, 1);
    assert_eq!(metrics.avg_days_to_complete, "2.0");
}

async fn insert_completed_swap(app: &TestApp, ticket: &str, days: i64) {
    let dispatched = Utc::now() - Duration::days(days + 2);
    swap_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket: Set(ticket.to_string()),
        part_abbreviation: Set("BT".to_string()),
        serial_num: Set("SN-5".to_string()),
        oem_claim_num: Set(None),
        date_requested: Set(dispatched - Duration::days(1)),
        status: Set(SwapStatus::Completed),
        stock_part_used_sku: Set(Some("BT-01".to_string())),
        stock_bin: Set(Some("B1".to_string())),
        dispatch_doa: Set(DoaFlag::No),
        inven_adjust: Set(None),
        date_dispatched: Set(Some(dispatched)),
        received_part_sku: Set(Some("BT-01-R".to_string())),
        received_ppid: Set(Some("PPID-8".to_string())),
        received_qty: Set(Some(1)),
        received_bin: Set(Some("R1".to_string())),
        received_doa: Set(DoaFlag::No),
        date_replenished: Set(Some(dispatched + Duration::days(days))),
        version: Set(3),
    }
    .insert(app.db())
    .await
    .expect("insert completed swap");
}
