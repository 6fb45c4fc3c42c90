//! Seed data script - populates the database with realistic demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 4 manual adjustments stocking the shelf bins
//! - 5 swap requests covering every lifecycle stage (pending dispatch,
//!   pending receipt, completed, completed with a DOA return)

use clap::Parser;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use swaptrack_api::events::{process_events, EventSender};
use swaptrack_api::migrator::Migrator;
use swaptrack_api::services::inventory::{InventoryService, ManualAdjustment};
use swaptrack_api::services::swaps::{
    DispatchDetails, NewSwapRequest, ReceiptDetails, SwapService,
};
use swaptrack_api::stock::StockSettings;

const SEED_ACTOR: &str = "seed-data";

#[derive(Parser)]
#[command(name = "seed-data", about = "Populate the database with demo swap-tracker data")]
struct SeedArgs {
    /// Database to seed; falls back to the DATABASE_URL environment variable
    #[arg(long)]
    database_url: Option<String>,

    /// Skip running migrations before seeding
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = SeedArgs::parse();

    info!("=== SwapTrack Seed Data ===");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://swaptrack.db?mode=rwc".to_string());

    let mut options = ConnectOptions::new(database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10));

    info!("Connecting to database: {}", database_url);
    let db = Arc::new(Database::connect(options).await?);
    info!("Connected!");

    if !args.skip_migrations {
        Migrator::up(db.as_ref(), None).await?;
        info!("Migrations applied");
    }

    let (event_tx, event_rx) = mpsc::channel(64);
    tokio::spawn(process_events(event_rx));
    let event_sender = Arc::new(EventSender::new(event_tx));

    let settings = StockSettings::default();
    let inventory = InventoryService::new(
        db.clone(),
        event_sender.clone(),
        settings.clone(),
        "ADJUSTMENT_BIN".to_string(),
        50,
    );
    let swaps = SwapService::new(db.clone(), event_sender, settings);

    info!("Stocking shelf bins...");
    let stocked = stock_shelves(&inventory).await?;
    info!("  Posted {} stocking adjustments", stocked);

    info!("Creating swap requests...");
    let created = create_swaps(&swaps).await?;
    info!("  Created {} swap requests across the lifecycle", created);

    info!("=== Seed Data Complete ===");
    info!("");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/swaps");
    info!("  curl http://localhost:8080/api/v1/swaps/completed");
    info!("  curl http://localhost:8080/api/v1/inventory/stock/summary");
    info!("  curl http://localhost:8080/api/v1/dashboard");
    info!("");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

async fn stock_shelves(inventory: &InventoryService) -> anyhow::Result<usize> {
    let stock = vec![
        ("LCD156-WXGA", 8, "SHELF-A1", "LCD"),
        ("BT-4CELL-52WH", 6, "SHELF-B2", "BT"),
        ("KBB-US-BLK", 5, "SHELF-C1", "KBB"),
        ("HT-SATA-1TB", 4, "SHELF-D4", "HT"),
    ];

    let mut count = 0;
    for (sku, quantity, bin, acronym) in stock {
        inventory
            .manual_adjustment(
                ManualAdjustment {
                    part_sku: sku.to_string(),
                    quantity,
                    bin: Some(bin.to_string()),
                    part_acronym: Some(acronym.to_string()),
                    notes: "Initial stock load".to_string(),
                },
                SEED_ACTOR,
            )
            .await?;
        count += 1;
    }

    Ok(count)
}

async fn create_swaps(swaps: &SwapService) -> anyhow::Result<usize> {
    // Two requests waiting for a part to be pulled
    for (ticket, abbr, serial) in [
        ("TCK-1001", "LCD", "5CG1234ABC"),
        ("TCK-1002", "BT", "5CG5678DEF"),
    ] {
        swaps
            .create_swap(NewSwapRequest {
                ticket: ticket.to_string(),
                part_abbreviation: abbr.to_string(),
                serial_num: serial.to_string(),
                oem_claim_num: None,
            })
            .await?;
    }

    // One dispatched, waiting for the failed part to come back
    let pending_receipt = swaps
        .create_swap(NewSwapRequest {
            ticket: "TCK-1003".to_string(),
            part_abbreviation: "KBB".to_string(),
            serial_num: "5CG9012GHI".to_string(),
            oem_claim_num: Some("OEM-55001".to_string()),
        })
        .await?;
    swaps
        .dispatch_swap(
            pending_receipt.id,
            DispatchDetails {
                stock_part_used_sku: "KBB-US-BLK".to_string(),
                stock_bin: "SHELF-C1".to_string(),
                dispatch_doa: false,
                inven_adjust: None,
            },
            SEED_ACTOR,
        )
        .await?;

    // One completed cleanly
    let completed = swaps
        .create_swap(NewSwapRequest {
            ticket: "TCK-1004".to_string(),
            part_abbreviation: "LCD".to_string(),
            serial_num: "5CG3456JKL".to_string(),
            oem_claim_num: None,
        })
        .await?;
    swaps
        .dispatch_swap(
            completed.id,
            DispatchDetails {
                stock_part_used_sku: "LCD156-WXGA".to_string(),
                stock_bin: "SHELF-A1".to_string(),
                dispatch_doa: false,
                inven_adjust: None,
            },
            SEED_ACTOR,
        )
        .await?;
    swaps
        .receive_swap(
            completed.id,
            ReceiptDetails {
                received_part_sku: "LCD156-WXGA-R".to_string(),
                received_ppid: "PPID-88432".to_string(),
                received_qty: 1,
                received_bin: "SHELF-A1".to_string(),
                received_doa: false,
            },
            SEED_ACTOR,
        )
        .await?;

    // One completed where the returned part was dead on arrival
    let doa_return = swaps
        .create_swap(NewSwapRequest {
            ticket: "TCK-1005".to_string(),
            part_abbreviation: "HT".to_string(),
            serial_num: "5CG7890MNO".to_string(),
            oem_claim_num: Some("OEM-55002".to_string()),
        })
        .await?;
    swaps
        .dispatch_swap(
            doa_return.id,
            DispatchDetails {
                stock_part_used_sku: "HT-SATA-1TB".to_string(),
                stock_bin: "SHELF-D4".to_string(),
                dispatch_doa: false,
                inven_adjust: Some("Pulled last unit on the shelf".to_string()),
            },
            SEED_ACTOR,
        )
        .await?;
    swaps
        .receive_swap(
            doa_return.id,
            ReceiptDetails {
                received_part_sku: "HT-SATA-1TB-R".to_string(),
                received_ppid: "PPID-90211".to_string(),
                received_qty: 1,
                received_bin: "SHELF-D4".to_string(),
                received_doa: true,
            },
            SEED_ACTOR,
        )
        .await?;

    Ok(5)
}
