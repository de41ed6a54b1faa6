//! Analytics Aggregator
//!
//! Turns a snapshot plus the matcher's output into window-scoped summaries
//! and a per-day series of purchase/sale totals. Sums are kept at full
//! precision; amounts are rounded only when the output structs are built.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use skinledger_core::{
    round_money, CurrencyConverter, FxRate, Item, Platform, Trade, TradeStatus, TradeType,
};

use crate::inventory::InventoryDeduplicator;
use crate::matcher::{MatchReport, MatchedTradePair};
use crate::snapshot::Snapshot;

/// Preset reporting periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl Period {
    /// Window covering this period up to the end of today: `[from, to)`
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let first_day = match self {
            Period::Week => today - Duration::days(7),
            Period::Month => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today - Duration::days(30)),
            Period::ThreeMonths => today
                .checked_sub_months(Months::new(3))
                .unwrap_or(today - Duration::days(90)),
        };

        (start_of_day(first_day), start_of_day(today) + Duration::days(1))
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::ThreeMonths => "3months",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "7d" => Ok(Period::Week),
            "month" | "30d" => Ok(Period::Month),
            "3months" | "quarter" | "90d" => Ok(Period::ThreeMonths),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Reporting window and optional platform restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    /// Inclusive start
    pub from: DateTime<Utc>,
    /// Exclusive end
    pub to: DateTime<Utc>,
    /// `None` means all platforms
    pub platform: Option<Platform>,
}

impl PeriodFilter {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            platform: None,
        }
    }

    pub fn for_period(period: Period, now: DateTime<Utc>) -> Self {
        let (from, to) = period.range(now);
        Self::new(from, to)
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn includes_platform(&self, platform: Platform) -> bool {
        self.platform.map(|p| p == platform).unwrap_or(true)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

/// Figures left out of totals because they could not be converted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialData {
    pub unconvertible_trades: usize,
    pub unconvertible_items: usize,
    pub unconvertible_pairs: usize,
}

impl PartialData {
    /// Whether any total in the summary is missing contributions
    pub fn is_partial(&self) -> bool {
        self.unconvertible_trades + self.unconvertible_items + self.unconvertible_pairs > 0
    }
}

/// Financial summary for a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub inventory_value: Decimal,
    pub inventory_count: usize,
    pub total_purchases: Decimal,
    pub purchases_count: usize,
    pub total_sales: Decimal,
    pub sales_count: usize,
    pub total_profit: Decimal,
    pub profit_percent: Decimal,
    pub matched_count: usize,
    /// Sales listed and not yet filled (not window-scoped)
    pub on_sale_count: usize,
    pub fx_rate: Option<FxRate>,
    pub partial: PartialData,
}

/// Purchase and sale totals for one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub purchases: Decimal,
    pub sales: Decimal,
    /// Purchases on this day left out of `purchases` for lack of a rate
    pub unconvertible_purchases: usize,
    /// Sales on this day left out of `sales` for lack of a rate
    pub unconvertible_sales: usize,
}

impl DailyPoint {
    /// Whether either total is missing contributions
    pub fn is_partial(&self) -> bool {
        self.unconvertible_purchases + self.unconvertible_sales > 0
    }
}

/// Summary and daily series computed from the same snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub daily: Vec<DailyPoint>,
}

/// Full-precision money total plus how many entries could not be converted
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: Decimal,
    unconvertible: usize,
}

/// Composes matcher, dedup and FX outputs into reports
pub struct AnalyticsAggregator<'a> {
    snapshot: &'a Snapshot,
    matches: &'a MatchReport,
    converter: &'a CurrencyConverter,
    fx_pair: &'a str,
}

impl<'a> AnalyticsAggregator<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        matches: &'a MatchReport,
        converter: &'a CurrencyConverter,
        fx_pair: &'a str,
    ) -> Self {
        Self {
            snapshot,
            matches,
            converter,
            fx_pair,
        }
    }

    /// Visible, non-cancelled trades of `trade_type` on the filtered platforms
    fn trades_of(&self, trade_type: TradeType, filter: &PeriodFilter) -> impl Iterator<Item = &'a Trade> + '_ {
        let filter = *filter;
        self.snapshot.trades.iter().filter(move |t| {
            t.trade_type == trade_type
                && !t.hidden
                && t.status != TradeStatus::Cancelled
                && filter.includes_platform(t.platform)
        })
    }

    /// BUYs counted as purchases in the window
    fn purchases(&self, filter: &PeriodFilter) -> Vec<&'a Trade> {
        self.trades_of(TradeType::Buy, filter)
            .filter(|t| t.traded_within(filter.from, filter.to))
            .collect()
    }

    /// Settled SELLs counted as sales in the window
    fn sales(&self, filter: &PeriodFilter) -> Vec<&'a Trade> {
        self.trades_of(TradeType::Sell, filter)
            .filter(|t| t.status.is_settled_sale() && t.traded_within(filter.from, filter.to))
            .collect()
    }

    fn tally_trades<'t, I>(&self, trades: I) -> Tally
    where
        I: IntoIterator<Item = &'t Trade>,
    {
        let mut tally = Tally::default();
        for trade in trades {
            let Some(price) = trade.price() else {
                debug!("[Analytics] Trade {} has no price, left out of totals", trade.id);
                continue;
            };
            match self.converter.convert(price, trade.platform) {
                Ok(usd) => tally.total += usd,
                Err(_) => tally.unconvertible += 1,
            }
        }
        tally
    }

    fn tally_inventory(&self, items: &[Item]) -> Tally {
        let mut tally = Tally::default();
        for item in items {
            let Some(listing) = &item.active_listing else {
                continue;
            };
            match self.converter.convert(listing.price, item.platform) {
                Ok(usd) => tally.total += usd,
                Err(_) => tally.unconvertible += 1,
            }
        }
        tally
    }

    /// Matched pairs reported in the window, at full precision
    ///
    /// A pair belongs to the platform its SELL happened on. Pairs with no
    /// date at all are always included.
    fn pairs_in(&self, filter: &PeriodFilter) -> Vec<&'a MatchedTradePair> {
        self.matches
            .pairs
            .iter()
            .filter(|p| filter.includes_platform(p.sell_platform))
            .filter(|p| p.reference_date().map(|d| filter.contains(d)).unwrap_or(true))
            .collect()
    }

    /// Window-scoped summary
    pub fn summary(&self, filter: &PeriodFilter) -> Summary {
        let inventory = InventoryDeduplicator::dedup(
            self.snapshot
                .items
                .iter()
                .filter(|i| filter.includes_platform(i.platform)),
        );
        let inventory_tally = self.tally_inventory(&inventory.items);

        let purchases = self.purchases(filter);
        let purchases_tally = self.tally_trades(purchases.iter().copied());

        let sales = self.sales(filter);
        let sales_tally = self.tally_trades(sales.iter().copied());

        let pairs = self.pairs_in(filter);
        let mut total_profit = Decimal::ZERO;
        let mut total_matched_buy = Decimal::ZERO;
        let mut unconvertible_pairs = 0;
        for pair in &pairs {
            match pair.figures() {
                Some(figures) => {
                    total_profit += figures.profit;
                    total_matched_buy += figures.buy_price;
                }
                None => unconvertible_pairs += 1,
            }
        }
        let profit_percent = if total_matched_buy > Decimal::ZERO {
            total_profit / total_matched_buy * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let on_sale_count = self
            .trades_of(TradeType::Sell, filter)
            .filter(|t| t.status == TradeStatus::Pending)
            .count();

        let partial = PartialData {
            unconvertible_trades: purchases_tally.unconvertible + sales_tally.unconvertible,
            unconvertible_items: inventory_tally.unconvertible,
            unconvertible_pairs,
        };
        if partial.is_partial() {
            warn!(
                "[Analytics] Summary is partial: no {} rate for {} trades, {} items, {} pairs",
                self.fx_pair,
                partial.unconvertible_trades,
                partial.unconvertible_items,
                partial.unconvertible_pairs
            );
        }

        Summary {
            inventory_value: round_money(inventory_tally.total),
            inventory_count: inventory.items.len(),
            total_purchases: round_money(purchases_tally.total),
            purchases_count: purchases.len(),
            total_sales: round_money(sales_tally.total),
            sales_count: sales.len(),
            total_profit: round_money(total_profit),
            profit_percent: round_money(profit_percent),
            matched_count: pairs.len(),
            on_sale_count,
            fx_rate: self.snapshot.latest_fx(self.fx_pair).cloned(),
            partial,
        }
    }

    /// Purchase and sale totals per UTC day of the window
    pub fn daily_series(&self, filter: &PeriodFilter) -> Vec<DailyPoint> {
        let purchases = self.purchases(filter);
        let sales = self.sales(filter);

        let mut points: Vec<DailyPoint> = Vec::new();
        let mut day = filter.from.date_naive();
        loop {
            let day_start = start_of_day(day);
            if day_start >= filter.to {
                break;
            }
            let day_end = day_start + Duration::days(1);
            let on_day = |t: &&Trade| t.traded_within(day_start, day_end);

            let day_purchases = self.tally_trades(purchases.iter().copied().filter(on_day));
            let day_sales = self.tally_trades(sales.iter().copied().filter(on_day));

            points.push(DailyPoint {
                date: day,
                purchases: round_money(day_purchases.total),
                sales: round_money(day_sales.total),
                unconvertible_purchases: day_purchases.unconvertible,
                unconvertible_sales: day_sales.unconvertible,
            });

            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        let partial_days = points.iter().filter(|p| p.is_partial()).count();
        if partial_days > 0 {
            warn!(
                "[Analytics] Daily series is partial: no {} rate on {} days",
                self.fx_pair, partial_days
            );
        }
        points
    }

    /// Matched pairs in the window, rounded for display
    pub fn profit_table(&self, filter: &PeriodFilter) -> Vec<MatchedTradePair> {
        self.pairs_in(filter).into_iter().map(|p| p.rounded()).collect()
    }

    pub fn dashboard(&self, filter: &PeriodFilter) -> Dashboard {
        Dashboard {
            summary: self.summary(filter),
            daily: self.daily_series(filter),
        }
    }
}
