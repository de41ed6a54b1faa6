//! Point-in-time snapshot of everything the engine reads

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use skinledger_core::{FxRate, Item, LedgerResult, Trade};

/// Items, trades and exchange rates read in one go from the backing store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub trades: Vec<Trade>,
    pub fx_rates: Vec<FxRate>,
}

impl Snapshot {
    pub fn new(items: Vec<Item>, trades: Vec<Trade>, fx_rates: Vec<FxRate>) -> Self {
        Self {
            items,
            trades,
            fx_rates,
        }
    }

    /// Most recently fetched rate for `pair`
    pub fn latest_fx(&self, pair: &str) -> Option<&FxRate> {
        FxRate::latest(&self.fx_rates, pair)
    }
}

/// Anything that can hand the engine a fresh snapshot
///
/// Implementations should read everything with a small, fixed number of
/// queries. A failure here is the only hard error the engine reports.
pub trait SnapshotSource {
    fn load_snapshot(&self) -> LedgerResult<Snapshot>;
}

impl SnapshotSource for Snapshot {
    fn load_snapshot(&self) -> LedgerResult<Snapshot> {
        Ok(self.clone())
    }
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Arc<S> {
    fn load_snapshot(&self) -> LedgerResult<Snapshot> {
        (**self).load_snapshot()
    }
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn load_snapshot(&self) -> LedgerResult<Snapshot> {
        (**self).load_snapshot()
    }
}
