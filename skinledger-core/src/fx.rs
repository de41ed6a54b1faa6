//! Currency normalization into the reporting currency (USD)

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::platform::Platform;

/// Pair identifier of the rate used for RUB -> USD conversion
pub const USDT_RUB: &str = "USDT_RUB";

/// Round a reporting-currency amount for output (2 dp, half away from zero)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Currencies prices can be quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Rub,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Rub => write!(f, "RUB"),
        }
    }
}

/// An exchange-rate record as fetched by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    /// Pair identifier, e.g. "USDT_RUB"
    pub pair: String,
    /// Units of quote currency per one unit of base currency
    pub rate: Decimal,
    /// When the rate was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FxRate {
    pub fn new(pair: impl Into<String>, rate: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            pair: pair.into(),
            rate,
            fetched_at,
        }
    }

    /// Most recently fetched record for `pair`
    pub fn latest<'a>(rates: &'a [FxRate], pair: &str) -> Option<&'a FxRate> {
        rates
            .iter()
            .filter(|r| r.pair == pair)
            .max_by_key(|r| r.fetched_at)
    }
}

/// A price could not be expressed in the reporting currency
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionError {
    #[error("no usable exchange rate for {pair}")]
    RateUnavailable { pair: String },
}

/// Converts platform-native prices into USD using the latest known rate
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    pair: String,
    /// USD per one RUB; `None` when no positive rate is known
    rub_to_usd: Option<Decimal>,
}

impl CurrencyConverter {
    /// Build a converter from the latest USDT_RUB record (if any)
    pub fn new(latest_usdt_rub: Option<&FxRate>) -> Self {
        let pair = latest_usdt_rub
            .map(|r| r.pair.clone())
            .unwrap_or_else(|| USDT_RUB.to_string());

        let rub_to_usd = latest_usdt_rub
            .map(|r| r.rate)
            .filter(|rate| *rate > Decimal::ZERO)
            .and_then(|rate| Decimal::ONE.checked_div(rate));

        Self { pair, rub_to_usd }
    }

    /// Pick the latest record for `pair` out of `rates` and build a converter
    pub fn from_rates(rates: &[FxRate], pair: &str) -> Self {
        let mut converter = Self::new(FxRate::latest(rates, pair));
        converter.pair = pair.to_string();
        converter
    }

    /// Whether RUB-quoted prices can currently be converted
    pub fn has_rate(&self) -> bool {
        self.rub_to_usd.is_some()
    }

    /// Convert `amount`, quoted in the platform's native currency, to USD
    pub fn convert(&self, amount: Decimal, platform: Platform) -> Result<Decimal, ConversionError> {
        self.convert_from(amount, platform.native_currency())
    }

    /// Convert `amount` in `currency` to USD
    pub fn convert_from(
        &self,
        amount: Decimal,
        currency: Currency,
    ) -> Result<Decimal, ConversionError> {
        match currency {
            Currency::Usd => Ok(amount),
            Currency::Rub => self
                .rub_to_usd
                .map(|factor| amount * factor)
                .ok_or_else(|| ConversionError::RateUnavailable {
                    pair: self.pair.clone(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn rate(value: Decimal, day: u32) -> FxRate {
        FxRate::new(USDT_RUB, value, Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_usd_passes_through() {
        let converter = CurrencyConverter::new(None);
        assert_eq!(converter.convert(dec!(12.5), Platform::CsFloat), Ok(dec!(12.5)));
        assert_eq!(converter.convert(dec!(3), Platform::Manual), Ok(dec!(3)));
    }

    #[test]
    fn test_rub_converts_with_rate() {
        let r = rate(dec!(100), 1);
        let converter = CurrencyConverter::new(Some(&r));
        assert_eq!(converter.convert(dec!(1500), Platform::MarketCsgo), Ok(dec!(15)));
    }

    #[test]
    fn test_rub_without_rate_is_unconvertible() {
        let converter = CurrencyConverter::new(None);
        assert!(!converter.has_rate());
        assert_eq!(
            converter.convert(dec!(1500), Platform::MarketCsgo),
            Err(ConversionError::RateUnavailable {
                pair: USDT_RUB.to_string()
            })
        );
    }

    #[test]
    fn test_non_positive_rate_is_unconvertible() {
        let r = rate(Decimal::ZERO, 1);
        let converter = CurrencyConverter::new(Some(&r));
        assert!(converter.convert(dec!(10), Platform::MarketCsgo).is_err());
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(4.245)), dec!(4.25));
        assert_eq!(round_money(dec!(-4.245)), dec!(-4.25));
        assert_eq!(round_money(dec!(0.333333)), dec!(0.33));
    }

    #[test]
    fn test_latest_rate_wins() {
        let rates = vec![rate(dec!(90), 1), rate(dec!(80), 3), rate(dec!(100), 2)];
        let latest = FxRate::latest(&rates, USDT_RUB).unwrap();
        assert_eq!(latest.rate, dec!(80));

        let converter = CurrencyConverter::from_rates(&rates, USDT_RUB);
        assert_eq!(converter.convert(dec!(800), Platform::MarketCsgo), Ok(dec!(10)));
    }
}
