//! Property-based tests for the derived stock views.
//!
//! These tests use proptest to verify the aggregation invariants across
//! arbitrary ledgers: reported stock is strictly positive, DOA bins never
//! leak into the views, rows come back sorted, and category tokens only
//! match as whole words.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use swaptrack_api::entities::inventory_log::{self, LogType};
use swaptrack_api::stock::{self, ResolveContext, StockSettings};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn plain_entry(
    log_type: LogType,
    sku: &str,
    quantity: i32,
    bin: &str,
    notes: &str,
) -> inventory_log::Model {
    inventory_log::Model {
        id: Uuid::new_v4(),
        occurred_at: base_time(),
        part_sku: sku.to_string(),
        quantity,
        log_type,
        bin: bin.to_string(),
        notes: notes.to_string(),
        related_request_id: None,
        part_acronym: None,
    }
}

// Strategies for generating test data
fn log_type_strategy() -> impl Strategy<Value = LogType> {
    prop_oneof![
        Just(LogType::Dispatched),
        Just(LogType::StockIn),
        Just(LogType::Adjustment),
        Just(LogType::ManualAdjustment),
    ]
}

fn seed_category_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["BC", "BT", "HT", "KBB", "LCD", "LCD-BC", "LCDC"]
}

fn usable_bin_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[A-E][0-9]", "SHELF-[A-D][0-9]"]
}

fn doa_bin_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("RMA/DOA".to_string()),
        Just("rma/doa overflow".to_string()),
        Just("WAREHOUSE-RMA/DOA-2".to_string()),
    ]
}

fn bin_strategy() -> impl Strategy<Value = String> {
    prop_oneof![usable_bin_strategy(), doa_bin_strategy()]
}

fn entry_strategy(
    bins: impl Strategy<Value = String>,
) -> impl Strategy<Value = inventory_log::Model> {
    (
        log_type_strategy(),
        "[A-Z]{2}-[0-9]{2}",
        -5i32..=5,
        bins,
        prop::option::of(seed_category_strategy()),
        0i64..10_000,
    )
        .prop_map(
            |(log_type, part_sku, quantity, bin, part_acronym, minutes)| inventory_log::Model {
                id: Uuid::new_v4(),
                occurred_at: base_time() + Duration::minutes(minutes),
                part_sku,
                quantity,
                log_type,
                bin,
                notes: String::new(),
                related_request_id: None,
                part_acronym,
            },
        )
}

fn any_ledger() -> impl Strategy<Value = Vec<inventory_log::Model>> {
    prop::collection::vec(entry_strategy(bin_strategy()), 0..40)
}

fn doa_only_ledger() -> impl Strategy<Value = Vec<inventory_log::Model>> {
    prop::collection::vec(entry_strategy(doa_bin_strategy()), 0..40)
}

fn labeled_ledger() -> impl Strategy<Value = Vec<inventory_log::Model>> {
    prop::collection::vec(
        (entry_strategy(bin_strategy()), seed_category_strategy()).prop_map(
            |(mut entry, category)| {
                entry.part_acronym = Some(category);
                entry
            },
        ),
        0..40,
    )
}

// Property: reported stock is strictly positive, deduplicated and sorted
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn detailed_rows_are_positive_unique_and_sorted(entries in any_ledger()) {
        let rows = stock::detailed_stock(&StockSettings::default(), &[], &entries);

        for row in &rows {
            prop_assert!(row.quantity > 0, "non-positive row reported: {:?}", row);
        }

        let mut keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.sku.as_str(), r.bin.as_str()))
            .collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), rows.len(), "duplicate (sku, bin) rows");

        for pair in rows.windows(2) {
            let a = (&pair[0].category, &pair[0].sku, &pair[0].bin);
            let b = (&pair[1].category, &pair[1].sku, &pair[1].bin);
            prop_assert!(a <= b, "rows out of order: {:?} then {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn summary_totals_are_strictly_positive(entries in any_ledger()) {
        let summary = stock::category_summary(&StockSettings::default(), &[], &entries);
        for (category, total) in &summary {
            prop_assert!(*total > 0, "category {} reported {}", category, total);
        }
    }

    #[test]
    fn summary_keys_are_always_known_categories(entries in any_ledger()) {
        let settings = StockSettings::default();
        let summary = stock::category_summary(&settings, &[], &entries);
        let known: Vec<String> = ResolveContext::new(&settings, &[], &entries)
            .known_categories()
            .into_iter()
            .map(|c| c.to_uppercase())
            .collect();
        for category in summary.keys() {
            prop_assert!(
                known.contains(&category.to_uppercase()),
                "summary carries unknown category {}",
                category
            );
        }
    }
}

// Property: DOA bins never contribute usable stock
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn doa_bins_never_reach_the_views(entries in any_ledger()) {
        let settings = StockSettings::default();
        let rows = stock::detailed_stock(&settings, &[], &entries);
        for row in &rows {
            prop_assert!(settings.is_usable_bin(&row.bin), "DOA bin {} leaked", row.bin);
        }
    }

    #[test]
    fn all_doa_ledgers_report_nothing(entries in doa_only_ledger()) {
        let settings = StockSettings::default();
        prop_assert!(stock::category_summary(&settings, &[], &entries).is_empty());
        prop_assert!(stock::detailed_stock(&settings, &[], &entries).is_empty());
    }
}

// Property: fully labeled ledgers sum exactly like a plain signed fold
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn labeled_ledgers_sum_like_a_plain_fold(entries in labeled_ledger()) {
        let settings = StockSettings::default();

        let mut expected: HashMap<String, i64> = HashMap::new();
        for entry in &entries {
            if settings.is_usable_bin(&entry.bin) {
                if let Some(acr) = entry.part_acronym.as_deref() {
                    *expected.entry(acr.to_string()).or_insert(0) += i64::from(entry.quantity);
                }
            }
        }
        expected.retain(|_, total| *total > 0);

        let summary = stock::category_summary(&settings, &[], &entries);
        prop_assert_eq!(summary.len(), expected.len());
        for (category, total) in &expected {
            prop_assert_eq!(summary.get(category), Some(total), "category {}", category);
        }
    }
}

// Property: category tokens match as whole words only
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn embedded_fragments_never_resolve(
        category in seed_category_strategy(),
        prefix in "[a-z0-9]{1,3}",
        suffix in "[a-z0-9]{1,3}",
    ) {
        let settings = StockSettings::default();
        let word = format!("{}{}{}", prefix, category, suffix);
        let entry = plain_entry(
            LogType::ManualAdjustment,
            &word,
            3,
            "A1",
            &format!("intake {}", word),
        );
        let ctx = ResolveContext::new(&settings, &[], std::slice::from_ref(&entry));
        prop_assert_eq!(ctx.resolve(&entry), None, "fragment {} resolved", word);
    }

    #[test]
    fn standalone_tokens_always_resolve(
        category in seed_category_strategy(),
        qty in 1i32..=5,
    ) {
        let settings = StockSettings::default();
        let entry = plain_entry(
            LogType::StockIn,
            "P-100",
            qty,
            "A1",
            &format!("bulk {} intake", category),
        );
        let ctx = ResolveContext::new(&settings, &[], std::slice::from_ref(&entry));
        prop_assert_eq!(ctx.resolve(&entry), Some(category));
    }
}
