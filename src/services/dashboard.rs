use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::EntityTrait;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::swap_request::{self, SwapStatus};
use crate::errors::ServiceError;
use crate::services::ledger;
use crate::stock::{self, StockSettings};

/// Point-in-time numbers for the landing dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub pending_dispatch_count: u64,
    pub pending_receipt_count: u64,
    pub completed_count: u64,
    pub total_pending: u64,
    /// Usable stock per resolved category
    pub part_stock_summary: BTreeMap<String, i64>,
    /// Mean whole-day cycle time over completed swaps, or "N/A"
    pub avg_days_to_complete: String,
}

/// Service for the dashboard rollup
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    settings: StockSettings,
}

impl DashboardService {
    /// Creates a new dashboard service instance
    pub fn new(db_pool: Arc<DbPool>, settings: StockSettings) -> Self {
        Self { db_pool, settings }
    }

    /// Computes every dashboard figure from one snapshot of the swap table
    /// and the ledger, so counts and stock totals always agree.
    #[instrument(skip(self))]
    pub async fn get_dashboard_metrics(&self) -> Result<DashboardMetrics, ServiceError> {
        let db = &*self.db_pool;
        let swaps = swap_request::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let entries = ledger::all_entries(db).await?;

        let count_with = |status: SwapStatus| -> u64 {
            swaps.iter().filter(|s| s.status == status).count() as u64
        };
        let pending_dispatch_count = count_with(SwapStatus::PendingDispatch);
        let pending_receipt_count = count_with(SwapStatus::PendingReceipt);
        let completed_count = count_with(SwapStatus::Completed);

        Ok(DashboardMetrics {
            pending_dispatch_count,
            pending_receipt_count,
            completed_count,
            total_pending: pending_dispatch_count + pending_receipt_count,
            part_stock_summary: stock::category_summary(&self.settings, &swaps, &entries),
            avg_days_to_complete: average_days_to_complete(
                swaps.iter().filter(|s| s.status == SwapStatus::Completed),
            ),
        })
    }
}

/// Mean cycle time over the given swaps, formatted with one decimal. Each
/// swap contributes its whole-day count; swaps missing either timestamp are
/// skipped, and "N/A" comes back when nothing qualifies.
pub fn average_days_to_complete<'a, I>(swaps: I) -> String
where
    I: IntoIterator<Item = &'a swap_request::Model>,
{
    let days: Vec<i64> = swaps
        .into_iter()
        .filter_map(|swap| swap.days_to_complete())
        .collect();
    if days.is_empty() {
        return "N/A".to_string();
    }
    let mean = days.iter().sum::<i64>() as f64 / days.len() as f64;
    format!("{:.1}", mean)
}
