pub mod common;
pub mod dashboard;
pub mod inventory;
pub mod metrics;
pub mod swaps;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::dashboard::DashboardService;
use crate::services::inventory::InventoryService;
use crate::services::swaps::SwapService;
use crate::stock::StockSettings;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub swaps: Arc<SwapService>,
    pub inventory: Arc<InventoryService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Builds the service container shared by every handler.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let settings = StockSettings::from(config);

        let swaps = Arc::new(SwapService::new(
            db_pool.clone(),
            event_sender.clone(),
            settings.clone(),
        ));
        let inventory = Arc::new(InventoryService::new(
            db_pool.clone(),
            event_sender,
            settings.clone(),
            config.default_adjustment_bin.clone(),
            config.recent_log_limit,
        ));
        let dashboard = Arc::new(DashboardService::new(db_pool, settings));

        Self {
            swaps,
            inventory,
            dashboard,
        }
    }
}
