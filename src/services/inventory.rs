use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};
use sea_orm::EntityTrait;
use tracing::{info, instrument, warn};

use crate::db::DbPool;
use crate::entities::inventory_log::{self, LogType};
use crate::entities::swap_request;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger::{self, NewLedgerEntry};
use crate::stock::{self, DetailedStockRow, ResolveContext, StockSettings};

lazy_static! {
    static ref MANUAL_ADJUSTMENTS: IntCounter = register_int_counter!(
        "manual_adjustments_total",
        "Total number of manual stock adjustments recorded"
    )
    .expect("metric can be created");
    static ref MANUAL_ADJUSTMENT_FAILURES: IntCounter = register_int_counter!(
        "manual_adjustment_failures_total",
        "Total number of rejected manual stock adjustments"
    )
    .expect("metric can be created");
}

/// Operator-entered stock correction.
#[derive(Debug, Clone)]
pub struct ManualAdjustment {
    pub part_sku: String,
    /// Signed delta; zero is rejected
    pub quantity: i32,
    /// Defaults to the configured adjustment bin when blank
    pub bin: Option<String>,
    pub part_acronym: Option<String>,
    pub notes: String,
}

/// Service for the inventory ledger and the stock views derived from it
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    settings: StockSettings,
    default_adjustment_bin: String,
    recent_log_limit: u64,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        settings: StockSettings,
        default_adjustment_bin: String,
        recent_log_limit: u64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            settings,
            default_adjustment_bin,
            recent_log_limit,
        }
    }

    /// Appends a manual correction to the ledger. Stock levels only ever
    /// change through appends, so a zero quantity is rejected outright.
    #[instrument(skip(self))]
    pub async fn manual_adjustment(
        &self,
        adjustment: ManualAdjustment,
        actor: &str,
    ) -> Result<inventory_log::Model, ServiceError> {
        let part_sku = adjustment.part_sku.trim().to_string();
        if part_sku.is_empty() {
            MANUAL_ADJUSTMENT_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "a part SKU is required".to_string(),
            ));
        }
        if adjustment.quantity == 0 {
            MANUAL_ADJUSTMENT_FAILURES.inc();
            return Err(ServiceError::InvalidInput(
                "adjustment quantity must be non-zero".to_string(),
            ));
        }

        let bin = adjustment
            .bin
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.default_adjustment_bin)
            .to_uppercase();
        let part_acronym = adjustment
            .part_acronym
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_uppercase);
        let reason = adjustment.notes.trim();
        let notes = if reason.is_empty() {
            format!("Manual Adjustment (by {})", actor)
        } else {
            format!("Manual Adjustment: {} (by {})", reason, actor)
        };

        let entry = ledger::append(
            &*self.db_pool,
            NewLedgerEntry {
                part_sku: part_sku.clone(),
                quantity: adjustment.quantity,
                log_type: LogType::ManualAdjustment,
                bin: bin.clone(),
                notes,
                related_request_id: None,
                part_acronym,
            },
        )
        .await
        .map_err(|e| {
            MANUAL_ADJUSTMENT_FAILURES.inc();
            e
        })?;

        MANUAL_ADJUSTMENTS.inc();
        info!(
            part_sku = %entry.part_sku,
            quantity = entry.quantity,
            bin = %entry.bin,
            "Recorded manual stock adjustment"
        );
        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                part_sku,
                quantity: adjustment.quantity,
                bin,
            })
            .await
        {
            warn!("Failed to publish stock adjusted event: {}", e);
        }
        Ok(entry)
    }

    /// Usable stock per resolved category, recomputed from the full ledger.
    #[instrument(skip(self))]
    pub async fn category_summary(&self) -> Result<BTreeMap<String, i64>, ServiceError> {
        let (swaps, entries) = self.load_ledger_context().await?;
        Ok(stock::category_summary(&self.settings, &swaps, &entries))
    }

    /// Usable stock per (SKU, bin), recomputed from the full ledger.
    #[instrument(skip(self))]
    pub async fn detailed_stock(&self) -> Result<Vec<DetailedStockRow>, ServiceError> {
        let (swaps, entries) = self.load_ledger_context().await?;
        Ok(stock::detailed_stock(&self.settings, &swaps, &entries))
    }

    /// Every part category currently known to the resolver, sorted.
    #[instrument(skip(self))]
    pub async fn known_categories(&self) -> Result<Vec<String>, ServiceError> {
        let (swaps, entries) = self.load_ledger_context().await?;
        Ok(ResolveContext::new(&self.settings, &swaps, &entries).known_categories())
    }

    /// The audit trail, newest first. Falls back to the configured limit.
    #[instrument(skip(self))]
    pub async fn recent_entries(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<inventory_log::Model>, ServiceError> {
        ledger::recent_entries(&*self.db_pool, limit.unwrap_or(self.recent_log_limit)).await
    }

    /// Distinct SKUs that have ever appeared in the ledger.
    #[instrument(skip(self))]
    pub async fn list_skus(&self) -> Result<Vec<String>, ServiceError> {
        ledger::distinct_skus(&*self.db_pool).await
    }

    async fn load_ledger_context(
        &self,
    ) -> Result<(Vec<swap_request::Model>, Vec<inventory_log::Model>), ServiceError> {
        let db = &*self.db_pool;
        let swaps = swap_request::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let entries = ledger::all_entries(db).await?;
        Ok((swaps, entries))
    }
}
