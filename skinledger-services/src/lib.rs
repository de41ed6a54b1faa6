//! Reconciliation services for SkinLedger
//!
//! This crate matches purchases to sales across marketplaces, collapses
//! duplicate inventory listings, classifies held items and aggregates
//! everything into period reports.

pub mod analytics;
pub mod inventory;
pub mod ledger;
pub mod lifecycle;
pub mod matcher;
pub mod snapshot;
pub mod snapshot_store;

pub use analytics::{
    AnalyticsAggregator, DailyPoint, Dashboard, PartialData, Period, PeriodFilter, Summary,
};
pub use inventory::{DedupOutcome, DedupReason, DroppedItem, InventoryDeduplicator};
pub use ledger::LedgerService;
pub use lifecycle::{HoldingState, LifecycleClassifier, LifecycleView};
pub use matcher::{
    MatchConfidence, MatchReport, MatchedTradePair, MatcherConfig, PairFigures, PassCounts,
    TradeMatcher, Valuation, DEFAULT_FLOAT_TOLERANCE,
};
pub use snapshot::{Snapshot, SnapshotSource};
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
