//! Item records: one marketplace listing/ownership record each

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::normalize::ItemIdentity;
use crate::platform::Platform;

/// The currently active listing of an item, if it is up for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveListing {
    /// Listing price in the platform's native currency
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_at: Option<DateTime<Utc>>,
}

/// A canonical item record as produced by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Internal identifier
    pub id: String,

    /// Identifier on the source platform
    pub external_id: String,

    /// Which platform this record came from
    pub platform: Platform,

    /// Display name, e.g. "AK-47 | Redline (Field-Tested)"
    pub name: String,

    /// Raw wear label as reported by the platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wear: Option<String>,

    /// Physical wear measurement in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,

    /// Platform-assigned persistent identifier for one physical unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_listing: Option<ActiveListing>,
}

impl Item {
    /// Create an item with only the required fields set
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        name: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            external_id: id.clone(),
            id,
            platform,
            name: name.into(),
            wear: None,
            float_value: None,
            asset_id: None,
            image_url: None,
            active_listing: None,
        }
    }

    pub fn with_asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }

    pub fn with_float(mut self, float_value: f64) -> Self {
        self.float_value = Some(float_value);
        self
    }

    pub fn with_wear(mut self, wear: impl Into<String>) -> Self {
        self.wear = Some(wear.into());
        self
    }

    pub fn with_listing(mut self, price: Decimal) -> Self {
        self.active_listing = Some(ActiveListing {
            price,
            listed_at: None,
        });
        self
    }

    /// Trimmed asset id, treating an empty string as absent
    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Normalized identity used for cross-platform comparison
    pub fn identity(&self) -> ItemIdentity {
        ItemIdentity::of(self)
    }
}
