//! Trade records: one economic event (a purchase or a sale) each

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::Platform;

/// Direction of a trade from the owner's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl std::str::FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            _ => Err(format!("Unknown trade type: {}", s)),
        }
    }
}

/// Custody status of a trade, as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Listed or awaiting the counterparty
    Pending,
    /// Accepted, item not yet delivered
    Accepted,
    /// Delivered, but under a platform trade ban
    TradeHold,
    /// Delivered and settled
    Completed,
    /// Final state; never counted anywhere
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "PENDING",
            TradeStatus::Accepted => "ACCEPTED",
            TradeStatus::TradeHold => "TRADE_HOLD",
            TradeStatus::Completed => "COMPLETED",
            TradeStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses under which a sale counts as having happened
    pub fn is_settled_sale(&self) -> bool {
        matches!(
            self,
            TradeStatus::Completed | TradeStatus::TradeHold | TradeStatus::Accepted
        )
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TradeStatus::Pending),
            "ACCEPTED" => Ok(TradeStatus::Accepted),
            "TRADE_HOLD" => Ok(TradeStatus::TradeHold),
            "COMPLETED" => Ok(TradeStatus::Completed),
            "CANCELLED" => Ok(TradeStatus::Cancelled),
            _ => Err(format!("Unknown trade status: {}", s)),
        }
    }
}

/// A single buy or sell event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,

    /// Owning item
    pub item_id: String,

    #[serde(rename = "type")]
    pub trade_type: TradeType,

    pub status: TradeStatus,

    /// Set for BUY trades, in the platform's native currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<Decimal>,

    /// Set for SELL trades, in the platform's native currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Decimal>,

    /// Seller fee as a fraction; falls back to the platform default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<Decimal>,

    pub platform: Platform,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub traded_at: Option<DateTime<Utc>>,

    /// When the trade ban on the item expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_unlock_at: Option<DateTime<Utc>>,

    /// User suppression flag
    #[serde(default)]
    pub hidden: bool,
}

impl Trade {
    /// A BUY trade at `price`
    pub fn buy(
        id: impl Into<String>,
        item_id: impl Into<String>,
        platform: Platform,
        price: Decimal,
        traded_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            trade_type: TradeType::Buy,
            status: TradeStatus::Completed,
            buy_price: Some(price),
            sell_price: None,
            commission: None,
            platform,
            traded_at,
            trade_unlock_at: None,
            hidden: false,
        }
    }

    /// A SELL trade at `price`
    pub fn sell(
        id: impl Into<String>,
        item_id: impl Into<String>,
        platform: Platform,
        price: Decimal,
        traded_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            trade_type: TradeType::Sell,
            status: TradeStatus::Completed,
            buy_price: None,
            sell_price: Some(price),
            commission: None,
            platform,
            traded_at,
            trade_unlock_at: None,
            hidden: false,
        }
    }

    pub fn with_status(mut self, status: TradeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = Some(commission);
        self
    }

    pub fn with_unlock_at(mut self, unlock_at: DateTime<Utc>) -> Self {
        self.trade_unlock_at = Some(unlock_at);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_buy(&self) -> bool {
        self.trade_type == TradeType::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.trade_type == TradeType::Sell
    }

    /// The price field matching this trade's type
    pub fn price(&self) -> Option<Decimal> {
        match self.trade_type {
            TradeType::Buy => self.buy_price,
            TradeType::Sell => self.sell_price,
        }
    }

    /// Commission fraction, defaulting per platform
    pub fn effective_commission(&self) -> Decimal {
        self.commission
            .unwrap_or_else(|| self.platform.default_commission())
    }

    /// Whether the trade falls in the half-open window `[from, to)`
    pub fn traded_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.traded_at
            .map(|t| t >= from && t < to)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_follows_type() {
        let mut buy = Trade::buy("b1", "i1", Platform::CsFloat, dec!(10), None);
        buy.sell_price = Some(dec!(99));
        assert_eq!(buy.price(), Some(dec!(10)));

        let sell = Trade::sell("s1", "i1", Platform::CsFloat, dec!(15), None);
        assert_eq!(sell.price(), Some(dec!(15)));
    }

    #[test]
    fn test_effective_commission() {
        let sell = Trade::sell("s1", "i1", Platform::MarketCsgo, dec!(15), None);
        assert_eq!(sell.effective_commission(), dec!(0.05));

        let sell = sell.with_commission(dec!(0.1));
        assert_eq!(sell.effective_commission(), dec!(0.1));
    }

    #[test]
    fn test_traded_within_is_half_open() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();

        let at_start = Trade::buy("b1", "i1", Platform::CsFloat, dec!(1), Some(from));
        let at_end = Trade::buy("b2", "i1", Platform::CsFloat, dec!(1), Some(to));
        let unknown = Trade::buy("b3", "i1", Platform::CsFloat, dec!(1), None);

        assert!(at_start.traded_within(from, to));
        assert!(!at_end.traded_within(from, to));
        assert!(!unknown.traded_within(from, to));
    }

    #[test]
    fn test_trade_wire_format() {
        let json = r#"{
            "id": "t1",
            "item_id": "i1",
            "type": "SELL",
            "status": "TRADE_HOLD",
            "sell_price": "1500",
            "platform": "MARKET_CSGO",
            "traded_at": "2025-01-03T10:00:00Z"
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert!(trade.is_sell());
        assert_eq!(trade.status, TradeStatus::TradeHold);
        assert_eq!(trade.price(), Some(dec!(1500)));
        assert!(!trade.hidden);
    }
}
