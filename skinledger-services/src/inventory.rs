//! Inventory deduplication across platforms
//!
//! The same physical item is often listed on more than one marketplace.
//! Collapsing those listings keeps inventory value from being counted twice.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use skinledger_core::Item;

/// Which key caused an item to be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupReason {
    AssetId,
    NameAndFloat,
}

/// An item removed as a duplicate of one seen earlier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedItem {
    pub item_id: String,
    pub reason: DedupReason,
}

/// Physically distinct items, in input order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupOutcome {
    pub items: Vec<Item>,
    pub dropped: Vec<DroppedItem>,
}

/// Collapses duplicate listings of the same physical item
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDeduplicator;

impl InventoryDeduplicator {
    /// Keep the first occurrence of every physical item
    ///
    /// An item is dropped when its asset id or its (normalized name, float)
    /// pair was already seen. The keys are checked independently, so a
    /// collision on either one removes the item.
    pub fn dedup<'a, I>(items: I) -> DedupOutcome
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut seen_assets: HashSet<String> = HashSet::new();
        let mut seen_name_float: HashSet<(String, u64)> = HashSet::new();
        let mut outcome = DedupOutcome::default();
        let mut total = 0usize;

        for item in items {
            total += 1;

            if let Some(asset_id) = item.asset_id() {
                if !seen_assets.insert(asset_id.to_string()) {
                    debug!("[Inventory] Dedup by asset_id: {} ({})", item.name, asset_id);
                    outcome.dropped.push(DroppedItem {
                        item_id: item.id.clone(),
                        reason: DedupReason::AssetId,
                    });
                    continue;
                }
            }

            if let Some(key) = item.identity().name_float_key() {
                if !seen_name_float.insert(key) {
                    debug!(
                        "[Inventory] Dedup by name+float: {} ({:?})",
                        item.name, item.float_value
                    );
                    outcome.dropped.push(DroppedItem {
                        item_id: item.id.clone(),
                        reason: DedupReason::NameAndFloat,
                    });
                    continue;
                }
            }

            outcome.items.push(item.clone());
        }

        info!("[Inventory] Dedup: {} -> {} items", total, outcome.items.len());
        outcome
    }
}
