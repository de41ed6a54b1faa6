//! Marketplace definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fx::Currency;

/// Marketplaces that trades and listings are collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    /// CSFloat - prices in USD
    #[serde(rename = "CSFLOAT")]
    CsFloat,
    /// Market.CSGO - prices in RUB
    MarketCsgo,
    /// Entered by hand (Buff, Waxpeer, ...), always recorded in USD
    Manual,
}

impl Platform {
    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::CsFloat => "CSFloat",
            Platform::MarketCsgo => "Market.CSGO",
            Platform::Manual => "Manual",
        }
    }

    /// Wire identifier, as stored by the ingestion layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::CsFloat => "CSFLOAT",
            Platform::MarketCsgo => "MARKET_CSGO",
            Platform::Manual => "MANUAL",
        }
    }

    /// Currency the platform quotes its prices in
    pub fn native_currency(&self) -> Currency {
        match self {
            Platform::MarketCsgo => Currency::Rub,
            Platform::CsFloat | Platform::Manual => Currency::Usd,
        }
    }

    /// Seller fee applied when a trade carries no explicit commission
    pub fn default_commission(&self) -> Decimal {
        match self {
            Platform::CsFloat => Decimal::new(2, 2),
            Platform::MarketCsgo => Decimal::new(5, 2),
            Platform::Manual => Decimal::ZERO,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csfloat" | "cf" => Ok(Platform::CsFloat),
            "market_csgo" | "market.csgo" | "marketcsgo" | "market" | "mc" => {
                Ok(Platform::MarketCsgo)
            }
            "manual" | "m" => Ok(Platform::Manual),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("CSFLOAT".parse::<Platform>(), Ok(Platform::CsFloat));
        assert_eq!("market_csgo".parse::<Platform>(), Ok(Platform::MarketCsgo));
        assert_eq!("Market.CSGO".parse::<Platform>(), Ok(Platform::MarketCsgo));
        assert_eq!("manual".parse::<Platform>(), Ok(Platform::Manual));
        assert!("steam".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_wire_format() {
        assert_eq!(serde_json::to_string(&Platform::CsFloat).unwrap(), "\"CSFLOAT\"");
        assert_eq!(
            serde_json::to_string(&Platform::MarketCsgo).unwrap(),
            "\"MARKET_CSGO\""
        );
        let parsed: Platform = serde_json::from_str("\"MANUAL\"").unwrap();
        assert_eq!(parsed, Platform::Manual);
    }

    #[test]
    fn test_default_commission() {
        assert_eq!(Platform::CsFloat.default_commission(), dec!(0.02));
        assert_eq!(Platform::MarketCsgo.default_commission(), dec!(0.05));
        assert_eq!(Platform::Manual.default_commission(), Decimal::ZERO);
    }
}
