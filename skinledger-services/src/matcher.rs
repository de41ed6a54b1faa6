//! Trade Matcher
//!
//! Pairs BUY and SELL trades that represent the same physical item changing
//! hands, across platforms, and computes realized profit per pair.
//!
//! Matching runs three passes in decreasing order of confidence. Each pass
//! runs to exhaustion before the next one starts, and a pairing removes both
//! trades from every later pass:
//!
//! 1. asset id: exact platform custody tag
//! 2. normalized name + float value within tolerance
//! 3. normalized name + buy date not after the sell date (heuristic)
//!
//! Within a pass, BUY candidates are scanned oldest first and the first
//! eligible one is taken. There is no global optimization over profit; the
//! result only depends on the input set, so reruns are identical.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use tracing::{debug, info, warn};

use skinledger_core::{
    round_money, ConversionError, CurrencyConverter, Item, ItemIdentity, LedgerError,
    LedgerResult, Platform, Trade, TradeStatus, TradeType, USDT_RUB,
};

/// Float difference a name+float match must stay strictly below
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 1e-7;

/// Configuration for the TradeMatcher
#[derive(Clone, Debug)]
pub struct MatcherConfig {
    pub float_tolerance: f64,
    /// Rate pair used to convert RUB-quoted prices
    pub fx_pair: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            float_tolerance: DEFAULT_FLOAT_TOLERANCE,
            fx_pair: USDT_RUB.to_string(),
        }
    }
}

impl MatcherConfig {
    /// Reject settings the passes cannot work with
    pub fn validate(&self) -> LedgerResult<()> {
        if !self.float_tolerance.is_finite() || self.float_tolerance <= 0.0 {
            return Err(LedgerError::config(format!(
                "float_tolerance must be a positive number, got {}",
                self.float_tolerance
            )));
        }
        if self.fx_pair.trim().is_empty() {
            return Err(LedgerError::config("fx_pair must not be empty"));
        }
        Ok(())
    }
}

/// Which pass produced a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Identical platform asset id
    AssetId,
    /// Same normalized name, float within tolerance
    NameAndFloat,
    /// Same normalized name, buy not after sell. Approximate.
    NameAndDate,
}

impl MatchConfidence {
    /// Whether the pairing is a best guess rather than an identity match
    pub fn is_heuristic(&self) -> bool {
        matches!(self, MatchConfidence::NameAndDate)
    }
}

/// Monetary figures of a pair, in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFigures {
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// Sell price after commission
    pub net_sell: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

impl PairFigures {
    pub fn compute(buy_price: Decimal, sell_price: Decimal, commission: Decimal) -> Self {
        let net_sell = sell_price * (Decimal::ONE - commission);
        let profit = net_sell - buy_price;
        let profit_percent = if buy_price > Decimal::ZERO {
            profit / buy_price * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Self {
            buy_price,
            sell_price,
            net_sell,
            profit,
            profit_percent,
        }
    }

    /// Copy with every figure rounded for display
    pub fn rounded(&self) -> Self {
        Self {
            buy_price: round_money(self.buy_price),
            sell_price: round_money(self.sell_price),
            net_sell: round_money(self.net_sell),
            profit: round_money(self.profit),
            profit_percent: round_money(self.profit_percent),
        }
    }
}

/// Profit figures of a pair, or the reason they could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Valuation {
    Converted(PairFigures),
    /// One of the prices is in a currency with no known rate
    Unconvertible { pair: String },
}

/// A BUY and a SELL determined to be the same item changing hands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTradePair {
    pub buy_trade_id: String,
    pub sell_trade_id: String,
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Commission fraction applied to the sell side
    pub commission: Decimal,
    pub buy_platform: Platform,
    pub sell_platform: Platform,
    pub buy_date: Option<DateTime<Utc>>,
    pub sell_date: Option<DateTime<Utc>>,
    pub confidence: MatchConfidence,
    pub valuation: Valuation,
}

impl MatchedTradePair {
    /// Figures in USD, if both prices were convertible
    pub fn figures(&self) -> Option<&PairFigures> {
        match &self.valuation {
            Valuation::Converted(figures) => Some(figures),
            Valuation::Unconvertible { .. } => None,
        }
    }

    /// Date the pair is reported under: the sale, else the purchase
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.sell_date.or(self.buy_date)
    }

    /// Copy with figures rounded for display
    pub fn rounded(&self) -> Self {
        let mut pair = self.clone();
        if let Valuation::Converted(figures) = &self.valuation {
            pair.valuation = Valuation::Converted(figures.rounded());
        }
        pair
    }
}

/// Number of pairs produced by each pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounts {
    pub asset_id: usize,
    pub name_and_float: usize,
    pub name_and_date: usize,
}

impl PassCounts {
    fn record(&mut self, confidence: MatchConfidence) {
        match confidence {
            MatchConfidence::AssetId => self.asset_id += 1,
            MatchConfidence::NameAndFloat => self.name_and_float += 1,
            MatchConfidence::NameAndDate => self.name_and_date += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.asset_id + self.name_and_float + self.name_and_date
    }
}

/// Result of one matching run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchReport {
    pub pairs: Vec<MatchedTradePair>,
    pub matched_buy_ids: BTreeSet<String>,
    pub matched_sell_ids: BTreeSet<String>,
    pub pass_counts: PassCounts,
    /// Eligible trades left out because their price field was empty
    pub skipped_missing_price: usize,
    /// Eligible trades left out because their item is not in the snapshot
    pub skipped_missing_item: usize,
}

impl MatchReport {
    pub fn is_buy_matched(&self, trade_id: &str) -> bool {
        self.matched_buy_ids.contains(trade_id)
    }

    pub fn is_sell_matched(&self, trade_id: &str) -> bool {
        self.matched_sell_ids.contains(trade_id)
    }

    /// Pairs whose prices could not be converted
    pub fn unconvertible_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.figures().is_none()).count()
    }
}

/// Why an eligible trade could not enter matching
enum Skip {
    MissingPrice,
    MissingItem,
}

/// A trade that passed the preconditions: price present, item resolved
struct PricedTrade<'a> {
    trade: &'a Trade,
    item: &'a Item,
    identity: ItemIdentity,
    price: Decimal,
}

impl<'a> PricedTrade<'a> {
    fn resolve(trade: &'a Trade, items: &HashMap<&str, &'a Item>) -> Result<Self, Skip> {
        let price = trade.price().ok_or(Skip::MissingPrice)?;
        let item = *items.get(trade.item_id.as_str()).ok_or(Skip::MissingItem)?;

        Ok(Self {
            trade,
            item,
            identity: item.identity(),
            price,
        })
    }

    fn asset_id(&self) -> Option<&str> {
        self.item.asset_id()
    }

    fn traded_at(&self) -> Option<DateTime<Utc>> {
        self.trade.traded_at
    }

    /// Oldest first, unknown dates last, ties by id
    fn chronological(a: &Self, b: &Self) -> Ordering {
        match (a.traded_at(), b.traded_at()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.trade.id.cmp(&b.trade.id))
    }
}

/// Map from a key to the unmatched BUYs carrying it, oldest first
fn index_unmatched<K, F>(buys: &[PricedTrade<'_>], used: &[bool], key: F) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    F: Fn(&PricedTrade<'_>) -> Option<K>,
{
    let mut index: HashMap<K, Vec<usize>> = HashMap::new();
    for (idx, buy) in buys.iter().enumerate() {
        if used[idx] {
            continue;
        }
        if let Some(k) = key(buy) {
            index.entry(k).or_default().push(idx);
        }
    }
    index
}

/// Pairs BUY and SELL trades one-to-one
#[derive(Debug, Clone, Default)]
pub struct TradeMatcher {
    config: MatcherConfig,
}

impl TradeMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match every eligible trade in `trades`
    ///
    /// BUYs are eligible when not hidden and not cancelled; SELLs when not
    /// hidden and settled (completed, trade hold or accepted). Visible but
    /// cancelled BUYs are excluded too, so they never supply a cost basis.
    /// Trades without their price or whose item is unknown are left out and
    /// counted in the report. This never fails.
    pub fn match_trades(
        &self,
        trades: &[Trade],
        items: &[Item],
        converter: &CurrencyConverter,
    ) -> MatchReport {
        let items_by_id: HashMap<&str, &Item> = items.iter().map(|i| (i.id.as_str(), i)).collect();
        let mut report = MatchReport::default();

        let mut buys: Vec<PricedTrade<'_>> = Vec::new();
        let mut sells: Vec<PricedTrade<'_>> = Vec::new();

        for trade in trades {
            let eligible = !trade.hidden
                && match trade.trade_type {
                    TradeType::Buy => trade.status != TradeStatus::Cancelled,
                    TradeType::Sell => trade.status.is_settled_sale(),
                };
            if !eligible {
                continue;
            }

            match PricedTrade::resolve(trade, &items_by_id) {
                Ok(priced) if trade.is_buy() => buys.push(priced),
                Ok(priced) => sells.push(priced),
                Err(Skip::MissingPrice) => {
                    debug!("[Matcher] Skipping {} {}: no price", trade.trade_type.as_str(), trade.id);
                    report.skipped_missing_price += 1;
                }
                Err(Skip::MissingItem) => {
                    warn!(
                        "[Matcher] Skipping {} {}: item {} not found",
                        trade.trade_type.as_str(),
                        trade.id,
                        trade.item_id
                    );
                    report.skipped_missing_item += 1;
                }
            }
        }

        buys.sort_by(PricedTrade::chronological);
        sells.sort_by(PricedTrade::chronological);

        let mut buy_used = vec![false; buys.len()];
        let mut sell_used = vec![false; sells.len()];
        let mut links: Vec<(usize, usize, MatchConfidence)> = Vec::new();

        self.asset_pass(&buys, &sells, &mut buy_used, &mut sell_used, &mut links);
        self.float_pass(&buys, &sells, &mut buy_used, &mut sell_used, &mut links);
        self.date_pass(&buys, &sells, &mut buy_used, &mut sell_used, &mut links);

        for (b, s, confidence) in links {
            let (buy, sell) = (&buys[b], &sells[s]);
            report.pass_counts.record(confidence);
            report.matched_buy_ids.insert(buy.trade.id.clone());
            report.matched_sell_ids.insert(sell.trade.id.clone());
            report.pairs.push(Self::build_pair(buy, sell, confidence, converter));
        }

        info!(
            "[Matcher] Matched {} trades ({} buys, {} sells; asset={}, float={}, date={})",
            report.pairs.len(),
            buys.len(),
            sells.len(),
            report.pass_counts.asset_id,
            report.pass_counts.name_and_float,
            report.pass_counts.name_and_date
        );

        report
    }

    /// Pass 1: identical asset id
    fn asset_pass(
        &self,
        buys: &[PricedTrade<'_>],
        sells: &[PricedTrade<'_>],
        buy_used: &mut [bool],
        sell_used: &mut [bool],
        links: &mut Vec<(usize, usize, MatchConfidence)>,
    ) {
        let index = index_unmatched(buys, buy_used, |b| b.asset_id().map(str::to_string));

        for (s, sell) in sells.iter().enumerate() {
            if sell_used[s] {
                continue;
            }
            let Some(asset_id) = sell.asset_id() else {
                continue;
            };
            let found = index
                .get(asset_id)
                .and_then(|bucket| bucket.iter().copied().find(|&b| !buy_used[b]));

            if let Some(b) = found {
                buy_used[b] = true;
                sell_used[s] = true;
                links.push((b, s, MatchConfidence::AssetId));
            }
        }
    }

    /// Pass 2: same normalized name, float within tolerance
    fn float_pass(
        &self,
        buys: &[PricedTrade<'_>],
        sells: &[PricedTrade<'_>],
        buy_used: &mut [bool],
        sell_used: &mut [bool],
        links: &mut Vec<(usize, usize, MatchConfidence)>,
    ) {
        let index = index_unmatched(buys, buy_used, |b| {
            b.identity
                .float_value
                .map(|_| b.identity.normalized_name.clone())
        });
        let tolerance = self.config.float_tolerance;

        for (s, sell) in sells.iter().enumerate() {
            if sell_used[s] {
                continue;
            }
            let Some(sell_float) = sell.identity.float_value else {
                continue;
            };
            let found = index
                .get(&sell.identity.normalized_name)
                .and_then(|bucket| {
                    bucket.iter().copied().find(|&b| {
                        !buy_used[b]
                            && buys[b]
                                .identity
                                .float_value
                                .map(|f| (f - sell_float).abs() < tolerance)
                                .unwrap_or(false)
                    })
                });

            if let Some(b) = found {
                buy_used[b] = true;
                sell_used[s] = true;
                links.push((b, s, MatchConfidence::NameAndFloat));
            }
        }
    }

    /// Pass 3: same normalized name, bought no later than sold
    fn date_pass(
        &self,
        buys: &[PricedTrade<'_>],
        sells: &[PricedTrade<'_>],
        buy_used: &mut [bool],
        sell_used: &mut [bool],
        links: &mut Vec<(usize, usize, MatchConfidence)>,
    ) {
        let index = index_unmatched(buys, buy_used, |b| Some(b.identity.normalized_name.clone()));

        for (s, sell) in sells.iter().enumerate() {
            if sell_used[s] {
                continue;
            }
            let found = index
                .get(&sell.identity.normalized_name)
                .and_then(|bucket| {
                    bucket.iter().copied().find(|&b| {
                        !buy_used[b]
                            && match (buys[b].traded_at(), sell.traded_at()) {
                                (Some(bought), Some(sold)) => bought <= sold,
                                _ => true,
                            }
                    })
                });

            if let Some(b) = found {
                debug!(
                    "[Matcher] Heuristic match {} -> {} ({})",
                    buys[b].trade.id, sell.trade.id, sell.identity.normalized_name
                );
                buy_used[b] = true;
                sell_used[s] = true;
                links.push((b, s, MatchConfidence::NameAndDate));
            }
        }
    }

    fn build_pair(
        buy: &PricedTrade<'_>,
        sell: &PricedTrade<'_>,
        confidence: MatchConfidence,
        converter: &CurrencyConverter,
    ) -> MatchedTradePair {
        let commission = sell.trade.effective_commission();

        let valuation = match (
            converter.convert(buy.price, buy.trade.platform),
            converter.convert(sell.price, sell.trade.platform),
        ) {
            (Ok(buy_usd), Ok(sell_usd)) => {
                Valuation::Converted(PairFigures::compute(buy_usd, sell_usd, commission))
            }
            (Err(ConversionError::RateUnavailable { pair }), _)
            | (_, Err(ConversionError::RateUnavailable { pair })) => {
                warn!(
                    "[Matcher] Pair {} -> {} has no {} rate, profit left unvalued",
                    buy.trade.id, sell.trade.id, pair
                );
                Valuation::Unconvertible { pair }
            }
        };

        MatchedTradePair {
            buy_trade_id: buy.trade.id.clone(),
            sell_trade_id: sell.trade.id.clone(),
            item_name: sell.item.name.clone(),
            image_url: sell
                .item
                .image_url
                .clone()
                .or_else(|| buy.item.image_url.clone()),
            commission,
            buy_platform: buy.trade.platform,
            sell_platform: sell.trade.platform,
            buy_date: buy.trade.traded_at,
            sell_date: sell.trade.traded_at,
            confidence,
            valuation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use skinledger_core::FxRate;

    fn day(d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 1, d, 12, 0, 0).unwrap())
    }

    fn run(trades: &[Trade], items: &[Item]) -> MatchReport {
        TradeMatcher::default().match_trades(trades, items, &CurrencyConverter::new(None))
    }

    #[test]
    fn test_asset_id_match_profit() {
        let items = vec![
            Item::new("ib", Platform::CsFloat, "AK-47 | Redline").with_asset_id("a1"),
            Item::new("is", Platform::CsFloat, "AK-47 | Redline").with_asset_id("a1"),
        ];
        let trades = vec![
            Trade::buy("b1", "ib", Platform::CsFloat, dec!(10), day(1)),
            Trade::sell("s1", "is", Platform::CsFloat, dec!(15), day(2)).with_commission(dec!(0.05)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        let pair = &report.pairs[0];
        assert_eq!(pair.confidence, MatchConfidence::AssetId);
        let figures = pair.figures().unwrap();
        assert_eq!(figures.net_sell, dec!(14.25));
        assert_eq!(figures.profit, dec!(4.25));
        assert_eq!(figures.profit_percent, dec!(42.5));
    }

    #[test]
    fn test_asset_id_wins_over_float() {
        // s1 has a float twin in b1 but its asset id belongs to b2
        let items = vec![
            Item::new("i1", Platform::CsFloat, "AWP | Asiimov").with_float(0.25),
            Item::new("i2", Platform::CsFloat, "AWP | Asiimov").with_asset_id("x").with_float(0.4),
            Item::new("i3", Platform::MarketCsgo, "AWP | Asiimov").with_asset_id("x").with_float(0.25),
        ];
        let trades = vec![
            Trade::buy("b1", "i1", Platform::CsFloat, dec!(50), day(1)),
            Trade::buy("b2", "i2", Platform::CsFloat, dec!(60), day(2)),
            Trade::sell("s1", "i3", Platform::CsFloat, dec!(70), day(3)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].buy_trade_id, "b2");
        assert_eq!(report.pairs[0].confidence, MatchConfidence::AssetId);
    }

    #[test]
    fn test_float_tolerance() {
        let items = vec![
            Item::new("ib", Platform::CsFloat, "M4A4 | Howl").with_float(0.123456700000010),
            Item::new("is", Platform::CsFloat, "m4a4 |  howl").with_float(0.123456700000020),
            Item::new("ib2", Platform::CsFloat, "Glock-18 | Fade").with_float(0.05),
            Item::new("is2", Platform::CsFloat, "Glock-18 | Fade").with_float(0.06),
        ];
        let trades = vec![
            Trade::buy("b1", "ib", Platform::CsFloat, dec!(100), day(1)),
            Trade::sell("s1", "is", Platform::CsFloat, dec!(120), day(2)),
            Trade::buy("b2", "ib2", Platform::CsFloat, dec!(100), day(5)),
            Trade::sell("s2", "is2", Platform::CsFloat, dec!(120), day(2)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].sell_trade_id, "s1");
        assert_eq!(report.pairs[0].confidence, MatchConfidence::NameAndFloat);
        // s2 differs by 0.01 and its only same-name buy is dated after it
        assert!(!report.is_sell_matched("s2"));
    }

    #[test]
    fn test_float_difference_at_tolerance_does_not_match() {
        let items = vec![
            Item::new("ib", Platform::CsFloat, "Desert Eagle | Blaze").with_float(0.5),
            Item::new("is", Platform::CsFloat, "Desert Eagle | Blaze").with_float(0.25),
        ];
        // Sold before bought, so the date fallback cannot pair them either
        let trades = vec![
            Trade::buy("b", "ib", Platform::CsFloat, dec!(100), day(5)),
            Trade::sell("s", "is", Platform::CsFloat, dec!(120), day(2)),
        ];
        let matcher = |float_tolerance: f64| {
            TradeMatcher::new(MatcherConfig {
                float_tolerance,
                ..MatcherConfig::default()
            })
        };
        let converter = CurrencyConverter::new(None);

        let at_bound = matcher(0.25).match_trades(&trades, &items, &converter);
        assert!(at_bound.pairs.is_empty());

        let above = matcher(0.2500001).match_trades(&trades, &items, &converter);
        assert_eq!(above.pass_counts.name_and_float, 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(MatcherConfig::default().validate().is_ok());

        let negative = MatcherConfig {
            float_tolerance: -1e-7,
            ..MatcherConfig::default()
        };
        assert!(matches!(negative.validate(), Err(LedgerError::Config(_))));

        let no_pair = MatcherConfig {
            fx_pair: " ".to_string(),
            ..MatcherConfig::default()
        };
        assert!(matches!(no_pair.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_date_fallback_takes_earliest_prior_buy() {
        let items = vec![Item::new("i", Platform::CsFloat, "AK-47 | Slate")];
        let trades = vec![
            Trade::buy("b5", "i", Platform::CsFloat, dec!(5), day(5)),
            Trade::buy("b1", "i", Platform::CsFloat, dec!(4), day(1)),
            Trade::sell("s3", "i", Platform::CsFloat, dec!(6), day(3)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].buy_trade_id, "b1");
        assert!(report.pairs[0].confidence.is_heuristic());
        assert!(!report.is_buy_matched("b5"));
    }

    #[test]
    fn test_unknown_dates_are_eligible() {
        let items = vec![Item::new("i", Platform::CsFloat, "AK-47 | Slate")];
        let trades = vec![
            Trade::buy("b1", "i", Platform::CsFloat, dec!(4), None),
            Trade::sell("s1", "i", Platform::CsFloat, dec!(6), day(3)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
    }

    #[test]
    fn test_missing_price_is_excluded() {
        let items = vec![Item::new("i", Platform::CsFloat, "AK-47 | Slate")];
        let mut no_price = Trade::buy("b1", "i", Platform::CsFloat, dec!(4), day(1));
        no_price.buy_price = None;
        let trades = vec![
            no_price,
            Trade::buy("b2", "i", Platform::CsFloat, dec!(5), day(2)),
            Trade::sell("s1", "i", Platform::CsFloat, dec!(6), day(3)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.skipped_missing_price, 1);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].buy_trade_id, "b2");
    }

    #[test]
    fn test_missing_item_is_excluded() {
        let items = vec![Item::new("i", Platform::CsFloat, "AK-47 | Slate")];
        let trades = vec![
            Trade::buy("b1", "ghost", Platform::CsFloat, dec!(4), day(1)),
            Trade::sell("s1", "i", Platform::CsFloat, dec!(6), day(3)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.skipped_missing_item, 1);
        assert!(report.pairs.is_empty());
    }

    #[test]
    fn test_ineligible_trades_are_ignored() {
        let items = vec![Item::new("i", Platform::CsFloat, "AK-47 | Slate")];
        let trades = vec![
            Trade::buy("hidden", "i", Platform::CsFloat, dec!(4), day(1)).hidden(),
            Trade::buy("cancelled", "i", Platform::CsFloat, dec!(4), day(1))
                .with_status(TradeStatus::Cancelled),
            Trade::sell("pending", "i", Platform::CsFloat, dec!(6), day(3))
                .with_status(TradeStatus::Pending),
            Trade::buy("b1", "i", Platform::CsFloat, dec!(4), day(2)),
            Trade::sell("s1", "i", Platform::CsFloat, dec!(6), day(3))
                .with_status(TradeStatus::Accepted),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].buy_trade_id, "b1");
        assert_eq!(report.pairs[0].sell_trade_id, "s1");
    }

    #[test]
    fn test_rub_pair_without_rate_is_unconvertible() {
        let items = vec![
            Item::new("ib", Platform::CsFloat, "AWP | Dragon Lore").with_asset_id("dl"),
            Item::new("is", Platform::MarketCsgo, "AWP | Dragon Lore").with_asset_id("dl"),
        ];
        let trades = vec![
            Trade::buy("b1", "ib", Platform::CsFloat, dec!(1000), day(1)),
            Trade::sell("s1", "is", Platform::MarketCsgo, dec!(120000), day(2)),
        ];

        let report = run(&trades, &items);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.unconvertible_count(), 1);
        assert_eq!(
            report.pairs[0].valuation,
            Valuation::Unconvertible {
                pair: USDT_RUB.to_string()
            }
        );

        let rate = FxRate::new(USDT_RUB, dec!(100), Utc::now());
        let converter = CurrencyConverter::new(Some(&rate));
        let report = TradeMatcher::default().match_trades(&trades, &items, &converter);
        let figures = report.pairs[0].figures().unwrap();
        assert_eq!(figures.sell_price, dec!(1200));
        // Market.CSGO default commission is 5%
        assert_eq!(figures.profit, dec!(140));
    }

    #[test]
    fn test_zero_buy_price_has_zero_percent() {
        let figures = PairFigures::compute(Decimal::ZERO, dec!(5), Decimal::ZERO);
        assert_eq!(figures.profit, dec!(5));
        assert_eq!(figures.profit_percent, Decimal::ZERO);
    }

    #[test]
    fn test_rounded_figures() {
        let figures = PairFigures::compute(dec!(3), dec!(4), dec!(0.02)).rounded();
        assert_eq!(figures.net_sell, dec!(3.92));
        assert_eq!(figures.profit_percent, dec!(30.67));
    }
}
