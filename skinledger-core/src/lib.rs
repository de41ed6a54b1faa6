//! Core types for the SkinLedger reconciliation engine
//!
//! This crate defines the records read from the ingestion layer (items,
//! trades, exchange rates) together with the pure conversions every other
//! component builds on: identity normalization and currency conversion.

pub mod error;
pub mod fx;
pub mod item;
pub mod normalize;
pub mod platform;
pub mod trade;

pub use error::{LedgerError, LedgerResult};
pub use fx::{round_money, ConversionError, Currency, CurrencyConverter, FxRate, USDT_RUB};
pub use item::{ActiveListing, Item};
pub use normalize::{normalize_float, normalize_name, normalize_wear, ItemIdentity};
pub use platform::Platform;
pub use trade::{Trade, TradeStatus, TradeType};
