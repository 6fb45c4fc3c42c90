//! Heuristic part-category resolution for ledger entries.
//!
//! Ledger entries do not reliably carry a part category: dispatches reference
//! a swap request, manual stock-ins may only mention the category in free
//! text, and older rows may record nothing at all. The resolver assigns each
//! entry an effective category using a fixed precedence of lookups over the
//! current swap and ledger data.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use super::StockSettings;
use crate::entities::inventory_log::{self, LogType};
use crate::entities::swap_request;

/// Lookup tables for category resolution, built once per read from the full
/// swap and ledger data sets.
pub struct ResolveContext<'a> {
    /// Uppercased category -> canonical casing. Swap requests take
    /// precedence over seeds and recorded ledger acronyms for casing.
    known: BTreeMap<String, String>,
    swaps_by_id: HashMap<Uuid, &'a swap_request::Model>,
    /// Trimmed SKU -> category, latest writer wins; dispatching swaps
    /// override categories learned from recorded ledger acronyms.
    sku_categories: HashMap<String, String>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        settings: &StockSettings,
        swaps: &'a [swap_request::Model],
        entries: &'a [inventory_log::Model],
    ) -> Self {
        let mut known: BTreeMap<String, String> = BTreeMap::new();

        for swap in swaps {
            let abbr = swap.part_abbreviation.trim();
            if !abbr.is_empty() {
                known.entry(abbr.to_uppercase()).or_insert_with(|| abbr.to_string());
            }
        }
        for seed in &settings.seed_categories {
            let seed = seed.trim();
            if !seed.is_empty() {
                known.entry(seed.to_uppercase()).or_insert_with(|| seed.to_string());
            }
        }
        for entry in entries {
            if let Some(acr) = entry.trimmed_acronym() {
                known.entry(acr.to_uppercase()).or_insert_with(|| acr.to_string());
            }
        }

        let swaps_by_id = swaps.iter().map(|s| (s.id, s)).collect();

        // SKU -> category map. Recorded stock-in acronyms are applied oldest
        // to newest so the latest recording wins, then dispatching swaps
        // overwrite them in dispatch order.
        let mut sku_categories: HashMap<String, String> = HashMap::new();

        let mut recorded: Vec<&inventory_log::Model> = entries
            .iter()
            .filter(|e| e.log_type.carries_recorded_category())
            .filter(|e| e.trimmed_acronym().is_some())
            .collect();
        recorded.sort_by_key(|e| e.occurred_at);
        for entry in recorded {
            if let Some(acr) = entry.trimmed_acronym() {
                if let Some(canonical) = known.get(&acr.to_uppercase()) {
                    let sku = entry.part_sku.trim();
                    if !sku.is_empty() {
                        sku_categories.insert(sku.to_string(), canonical.clone());
                    }
                }
            }
        }

        let mut dispatched: Vec<&swap_request::Model> = swaps
            .iter()
            .filter(|s| {
                s.stock_part_used_sku
                    .as_deref()
                    .map(|sku| !sku.trim().is_empty())
                    .unwrap_or(false)
                    && !s.part_abbreviation.trim().is_empty()
            })
            .collect();
        dispatched.sort_by_key(|s| s.date_dispatched);
        for swap in dispatched {
            if let Some(sku) = swap.stock_part_used_sku.as_deref() {
                sku_categories.insert(
                    sku.trim().to_string(),
                    swap.part_abbreviation.trim().to_string(),
                );
            }
        }

        Self {
            known,
            swaps_by_id,
            sku_categories,
        }
    }

    /// All known categories in canonical casing, sorted.
    pub fn known_categories(&self) -> Vec<String> {
        self.known.values().cloned().collect()
    }

    /// Resolves the effective category for one ledger entry. Returns `None`
    /// when no rule matches; such entries are excluded from category-grouped
    /// views but still count toward per-SKU stock.
    pub fn resolve(&self, entry: &inventory_log::Model) -> Option<String> {
        // 1. The entry's own recorded acronym, verbatim. The known set is
        //    built from all recorded acronyms, so any non-blank value that
        //    was ever accepted by a write path matches here.
        if let Some(acr) = entry.trimmed_acronym() {
            if self.known.contains_key(&acr.to_uppercase()) {
                return Some(acr.to_string());
            }
        }

        // 2. The linked swap request's category.
        if let Some(id) = entry.related_request_id {
            if let Some(swap) = self.swaps_by_id.get(&id) {
                let abbr = swap.part_abbreviation.trim();
                if !abbr.is_empty() {
                    return Some(abbr.to_string());
                }
            }
        }

        // 3. For stock-in style entries, scan the SKU text and then the
        //    notes for a known category appearing as a standalone word.
        if matches!(
            entry.log_type,
            LogType::Adjustment | LogType::StockIn | LogType::ManualAdjustment
        ) {
            if let Some(category) = self.match_known_token(&entry.part_sku) {
                return Some(category);
            }
            if let Some(category) = self.match_known_token(&entry.notes) {
                return Some(category);
            }
        }

        // 4. The last category recorded against this exact SKU.
        self.sku_categories.get(entry.part_sku.trim()).cloned()
    }

    /// Scans `text` for any known category as a whole word, checking
    /// categories in lexicographic order for determinism.
    fn match_known_token(&self, text: &str) -> Option<String> {
        let upper = text.to_uppercase();
        for (key, canonical) in &self.known {
            if contains_word(&upper, key) {
                return Some(canonical.clone());
            }
        }
        None
    }
}

/// Whole-word containment: the token must stand alone between whitespace or
/// string boundaries, never as a fragment of a longer word.
fn contains_word(text: &str, token: &str) -> bool {
    text.split_whitespace().any(|word| word == token)
}
