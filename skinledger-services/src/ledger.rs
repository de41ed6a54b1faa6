//! Ledger Service
//!
//! Facade over the reconciliation engine. Every call reads one fresh
//! snapshot from the source and computes its answer in memory.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use skinledger_core::{CurrencyConverter, LedgerResult, Platform};

use crate::analytics::{AnalyticsAggregator, DailyPoint, Dashboard, PeriodFilter, Summary};
use crate::inventory::{DedupOutcome, InventoryDeduplicator};
use crate::lifecycle::{LifecycleClassifier, LifecycleView};
use crate::matcher::{MatchReport, MatchedTradePair, MatcherConfig, TradeMatcher};
use crate::snapshot::{Snapshot, SnapshotSource};

/// Snapshot plus everything derived from it that most reports need
struct Reconciled {
    snapshot: Snapshot,
    converter: CurrencyConverter,
    matches: MatchReport,
}

/// Service for reconciled trading reports
pub struct LedgerService<S: SnapshotSource> {
    source: S,
    matcher: TradeMatcher,
}

impl<S: SnapshotSource> LedgerService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            matcher: TradeMatcher::default(),
        }
    }

    /// Service with a custom matcher setup, rejected if it is unusable
    pub fn with_config(source: S, config: MatcherConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            source,
            matcher: TradeMatcher::new(config),
        })
    }

    fn fx_pair(&self) -> &str {
        &self.matcher.config().fx_pair
    }

    fn reconcile(&self) -> LedgerResult<Reconciled> {
        let snapshot = self.source.load_snapshot()?;
        let converter = CurrencyConverter::from_rates(&snapshot.fx_rates, self.fx_pair());
        let matches = self
            .matcher
            .match_trades(&snapshot.trades, &snapshot.items, &converter);

        Ok(Reconciled {
            snapshot,
            converter,
            matches,
        })
    }

    /// All matched pairs, rounded for display
    #[instrument(skip(self))]
    pub fn matched_trades(&self) -> LedgerResult<Vec<MatchedTradePair>> {
        let reconciled = self.reconcile()?;
        Ok(reconciled.matches.pairs.iter().map(|p| p.rounded()).collect())
    }

    /// The full match report, including skip counters
    pub fn match_report(&self) -> LedgerResult<MatchReport> {
        Ok(self.reconcile()?.matches)
    }

    /// Deduplicated inventory across all platforms
    pub fn inventory(&self) -> LedgerResult<DedupOutcome> {
        self.inventory_on(None)
    }

    /// Deduplicated inventory, restricted to `platform` before dedup
    pub fn inventory_on(&self, platform: Option<Platform>) -> LedgerResult<DedupOutcome> {
        let snapshot = self.source.load_snapshot()?;
        Ok(InventoryDeduplicator::dedup(
            snapshot
                .items
                .iter()
                .filter(|i| platform.map(|p| p == i.platform).unwrap_or(true)),
        ))
    }

    /// Purchases not yet matched to a sale, split by ownership state
    #[instrument(skip(self))]
    pub fn lifecycle(&self, now: DateTime<Utc>) -> LedgerResult<LifecycleView> {
        let reconciled = self.reconcile()?;
        let held = reconciled
            .snapshot
            .trades
            .iter()
            .filter(|t| t.is_buy() && !reconciled.matches.is_buy_matched(&t.id));

        Ok(LifecycleClassifier::classify(held, now))
    }

    #[instrument(skip(self))]
    pub fn summary(&self, filter: &PeriodFilter) -> LedgerResult<Summary> {
        let reconciled = self.reconcile()?;
        Ok(self.aggregator(&reconciled).summary(filter))
    }

    pub fn daily_series(&self, filter: &PeriodFilter) -> LedgerResult<Vec<DailyPoint>> {
        let reconciled = self.reconcile()?;
        Ok(self.aggregator(&reconciled).daily_series(filter))
    }

    pub fn profit_table(&self, filter: &PeriodFilter) -> LedgerResult<Vec<MatchedTradePair>> {
        let reconciled = self.reconcile()?;
        Ok(self.aggregator(&reconciled).profit_table(filter))
    }

    /// Summary and daily series from a single snapshot
    #[instrument(skip(self))]
    pub fn dashboard(&self, filter: &PeriodFilter) -> LedgerResult<Dashboard> {
        let reconciled = self.reconcile()?;
        let dashboard = self.aggregator(&reconciled).dashboard(filter);
        debug!(
            "[Ledger] Dashboard: {} matched, {} days",
            dashboard.summary.matched_count,
            dashboard.daily.len()
        );
        Ok(dashboard)
    }

    fn aggregator<'a>(&'a self, reconciled: &'a Reconciled) -> AnalyticsAggregator<'a> {
        AnalyticsAggregator::new(
            &reconciled.snapshot,
            &reconciled.matches,
            &reconciled.converter,
            self.fx_pair(),
        )
    }
}
