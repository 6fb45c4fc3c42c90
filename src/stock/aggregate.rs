//! Folds the resolved ledger into the two stock views.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::resolver::ResolveContext;
use super::StockSettings;
use crate::entities::inventory_log;
use crate::entities::swap_request;

/// One row of the per-location stock view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DetailedStockRow {
    /// Display category, when one can be determined
    pub category: Option<String>,
    pub sku: String,
    pub bin: String,
    pub quantity: i64,
}

/// Usable stock per category. Entries that resolve to no category are
/// skipped; only strictly positive totals are retained.
pub fn category_summary(
    settings: &StockSettings,
    swaps: &[swap_request::Model],
    entries: &[inventory_log::Model],
) -> BTreeMap<String, i64> {
    let ctx = ResolveContext::new(settings, swaps, entries);

    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for entry in entries {
        if !settings.is_usable_bin(&entry.bin) {
            continue;
        }
        if let Some(category) = ctx.resolve(entry) {
            *totals.entry(category).or_insert(0) += i64::from(entry.quantity);
        }
    }
    totals.retain(|_, total| *total > 0);
    totals
}

/// Usable stock per (SKU, bin), strictly positive sums only. The display
/// category comes from the most recent stock-in style entry that recorded
/// one; groups without any recorded category fall back to resolving their
/// latest entry, and may stay uncategorized.
pub fn detailed_stock(
    settings: &StockSettings,
    swaps: &[swap_request::Model],
    entries: &[inventory_log::Model],
) -> Vec<DetailedStockRow> {
    let ctx = ResolveContext::new(settings, swaps, entries);

    struct Group<'a> {
        total: i64,
        latest: &'a inventory_log::Model,
        labeled: Option<&'a inventory_log::Model>,
    }

    let mut groups: BTreeMap<(String, String), Group> = BTreeMap::new();

    for entry in entries {
        if !settings.is_usable_bin(&entry.bin) || entry.part_sku.trim().is_empty() {
            continue;
        }
        let key = (entry.part_sku.clone(), entry.bin.clone());
        let group = groups.entry(key).or_insert(Group {
            total: 0,
            latest: entry,
            labeled: None,
        });
        group.total += i64::from(entry.quantity);
        if entry.occurred_at >= group.latest.occurred_at {
            group.latest = entry;
        }
        if entry.log_type.carries_recorded_category() && entry.trimmed_acronym().is_some() {
            let newer = group
                .labeled
                .map(|current| entry.occurred_at >= current.occurred_at)
                .unwrap_or(true);
            if newer {
                group.labeled = Some(entry);
            }
        }
    }

    let mut rows: Vec<DetailedStockRow> = groups
        .into_iter()
        .filter(|(_, group)| group.total > 0)
        .map(|((sku, bin), group)| {
            let category = group
                .labeled
                .and_then(|e| e.trimmed_acronym().map(str::to_string))
                .or_else(|| ctx.resolve(group.latest));
            DetailedStockRow {
                category,
                sku,
                bin,
                quantity: group.total,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.sku.cmp(&b.sku))
            .then_with(|| a.bin.cmp(&b.bin))
    });
    rows
}
