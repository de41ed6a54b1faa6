//! Ownership lifecycle of held purchases
//!
//! A purchase that has not been matched to a sale is still owned. Depending
//! on its custody status and trade-ban timer it is either tradable now or
//! waiting out a trade hold.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use skinledger_core::{Platform, Trade, TradeStatus};

/// Read-time state of a held purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingState {
    /// Can be re-listed right now
    Tradable,
    /// Under a platform trade ban
    TradeHold,
    /// Bought, not yet delivered
    InTransit,
}

/// Held purchases split into disjoint views
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleView {
    pub tradable: Vec<Trade>,
    /// Soonest unlock first; unknown unlock times last
    pub trade_hold: Vec<Trade>,
    pub hidden: Vec<Trade>,
    pub in_transit: Vec<Trade>,
}

impl LifecycleView {
    /// Remaining trade-ban time per held trade, `None` when unknown
    pub fn unlock_countdown(&self, now: DateTime<Utc>) -> Vec<(String, Option<Duration>)> {
        self.trade_hold
            .iter()
            .map(|t| (t.id.clone(), LifecycleClassifier::time_until_unlock(t, now)))
            .collect()
    }
}

/// Classifies still-held BUY trades
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleClassifier;

impl LifecycleClassifier {
    /// State of one purchase, ignoring the hidden flag
    ///
    /// Returns `None` for cancelled trades and for sales.
    pub fn state(trade: &Trade, now: DateTime<Utc>) -> Option<HoldingState> {
        if !trade.is_buy() {
            return None;
        }

        let unlocked = trade.trade_unlock_at.map(|at| at <= now);

        match trade.status {
            TradeStatus::Cancelled => None,
            TradeStatus::Pending | TradeStatus::Accepted => Some(HoldingState::InTransit),
            TradeStatus::Completed if trade.platform == Platform::Manual => {
                Some(HoldingState::Tradable)
            }
            TradeStatus::Completed => match unlocked {
                None | Some(true) => Some(HoldingState::Tradable),
                Some(false) => Some(HoldingState::TradeHold),
            },
            TradeStatus::TradeHold => match unlocked {
                Some(true) => Some(HoldingState::Tradable),
                None | Some(false) => Some(HoldingState::TradeHold),
            },
        }
    }

    /// Time left on the trade ban, if there is a future unlock time
    pub fn time_until_unlock(trade: &Trade, now: DateTime<Utc>) -> Option<Duration> {
        trade
            .trade_unlock_at
            .filter(|at| *at > now)
            .map(|at| at - now)
    }

    /// Partition held purchases
    ///
    /// Hidden trades go to `hidden` no matter their status; cancelled trades
    /// appear nowhere.
    pub fn classify<'a, I>(trades: I, now: DateTime<Utc>) -> LifecycleView
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut view = LifecycleView::default();

        for trade in trades {
            let Some(state) = Self::state(trade, now) else {
                continue;
            };

            if trade.hidden {
                view.hidden.push(trade.clone());
                continue;
            }

            match state {
                HoldingState::Tradable => view.tradable.push(trade.clone()),
                HoldingState::TradeHold => view.trade_hold.push(trade.clone()),
                HoldingState::InTransit => view.in_transit.push(trade.clone()),
            }
        }

        view.trade_hold.sort_by(|a, b| {
            match (a.trade_unlock_at, b.trade_unlock_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.id.cmp(&b.id))
        });

        debug!(
            "[Lifecycle] tradable={}, trade_hold={}, in_transit={}, hidden={}",
            view.tradable.len(),
            view.trade_hold.len(),
            view.in_transit.len(),
            view.hidden.len()
        );

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn buy(id: &str, platform: Platform, status: TradeStatus) -> Trade {
        Trade::buy(id, "i", platform, dec!(10), Some(now() - Duration::days(3))).with_status(status)
    }

    #[test]
    fn test_completed_without_timer_is_tradable() {
        let trade = buy("b", Platform::CsFloat, TradeStatus::Completed);
        assert_eq!(LifecycleClassifier::state(&trade, now()), Some(HoldingState::Tradable));
    }

    #[test]
    fn test_trade_hold_timer() {
        let future = buy("b1", Platform::CsFloat, TradeStatus::TradeHold)
            .with_unlock_at(now() + Duration::days(2));
        let elapsed = buy("b2", Platform::MarketCsgo, TradeStatus::TradeHold)
            .with_unlock_at(now() - Duration::hours(1));
        let unknown = buy("b3", Platform::CsFloat, TradeStatus::TradeHold);

        assert_eq!(LifecycleClassifier::state(&future, now()), Some(HoldingState::TradeHold));
        assert_eq!(LifecycleClassifier::state(&elapsed, now()), Some(HoldingState::Tradable));
        assert_eq!(LifecycleClassifier::state(&unknown, now()), Some(HoldingState::TradeHold));
    }

    #[test]
    fn test_manual_completed_is_always_tradable() {
        let manual = buy("b1", Platform::Manual, TradeStatus::Completed)
            .with_unlock_at(now() + Duration::days(5));
        let platform = buy("b2", Platform::CsFloat, TradeStatus::Completed)
            .with_unlock_at(now() + Duration::days(5));

        assert_eq!(LifecycleClassifier::state(&manual, now()), Some(HoldingState::Tradable));
        assert_eq!(LifecycleClassifier::state(&platform, now()), Some(HoldingState::TradeHold));
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let trades = vec![
            buy("tradable", Platform::CsFloat, TradeStatus::Completed),
            buy("held", Platform::CsFloat, TradeStatus::TradeHold),
            buy("hidden", Platform::CsFloat, TradeStatus::TradeHold).hidden(),
            buy("cancelled", Platform::CsFloat, TradeStatus::Cancelled),
            buy("pending", Platform::MarketCsgo, TradeStatus::Pending),
            Trade::sell("sale", "i", Platform::CsFloat, dec!(12), None),
        ];

        let view = LifecycleClassifier::classify(&trades, now());
        let ids = |v: &[Trade]| v.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&view.tradable), vec!["tradable"]);
        assert_eq!(ids(&view.trade_hold), vec!["held"]);
        assert_eq!(ids(&view.hidden), vec!["hidden"]);
        assert_eq!(ids(&view.in_transit), vec!["pending"]);
    }

    #[test]
    fn test_trade_hold_sorted_by_unlock() {
        let trades = vec![
            buy("unknown", Platform::CsFloat, TradeStatus::TradeHold),
            buy("later", Platform::CsFloat, TradeStatus::TradeHold)
                .with_unlock_at(now() + Duration::days(6)),
            buy("sooner", Platform::CsFloat, TradeStatus::TradeHold)
                .with_unlock_at(now() + Duration::days(1)),
        ];

        let view = LifecycleClassifier::classify(&trades, now());
        let order: Vec<&str> = view.trade_hold.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["sooner", "later", "unknown"]);

        let countdown = view.unlock_countdown(now());
        assert_eq!(countdown[0].1, Some(Duration::days(1)));
        assert_eq!(countdown[2].1, None);
    }
}
