/*!
 * Derived stock views.
 *
 * Stock levels are never stored; they are recomputed on every read from the
 * full inventory ledger. `resolver` assigns a part category to each ledger
 * entry, `aggregate` folds the resolved entries into the category summary and
 * the per-location detail view. Everything here is pure: callers pass the
 * swap and ledger rows in, nothing touches the database.
 */

pub mod aggregate;
pub mod resolver;

pub use aggregate::{category_summary, detailed_stock, DetailedStockRow};
pub use resolver::ResolveContext;

use crate::config::AppConfig;

/// Knobs for the derived stock views, passed in explicitly by the caller
/// rather than read from process-wide state.
#[derive(Debug, Clone)]
pub struct StockSettings {
    /// Any bin containing this marker holds unusable (DOA/RMA) stock
    pub doa_bin_sentinel: String,
    /// Categories known before any swap or ledger data exists
    pub seed_categories: Vec<String>,
}

impl StockSettings {
    pub fn new(doa_bin_sentinel: impl Into<String>, seed_categories: Vec<String>) -> Self {
        Self {
            doa_bin_sentinel: doa_bin_sentinel.into(),
            seed_categories,
        }
    }

    /// Whether entries in this bin count toward usable stock
    pub fn is_usable_bin(&self, bin: &str) -> bool {
        !bin.to_uppercase()
            .contains(&self.doa_bin_sentinel.to_uppercase())
    }
}

impl Default for StockSettings {
    fn default() -> Self {
        Self {
            doa_bin_sentinel: "RMA/DOA".to_string(),
            seed_categories: ["BC", "BT", "HT", "KBB", "LCD", "LCD-BC", "LCDC"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<&AppConfig> for StockSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            doa_bin_sentinel: cfg.doa_bin_sentinel.clone(),
            seed_categories: cfg.seed_category_list(),
        }
    }
}
