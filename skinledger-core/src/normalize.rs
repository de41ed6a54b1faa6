//! Item identity normalization
//!
//! Platforms format the same skin differently ("★ Karambit | Doppler" vs
//! "★Karambit|Doppler", "FT" vs "Field-Tested"). Everything here collapses
//! those cosmetic differences into one comparison key.

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Decimal digits kept when comparing float values
pub const FLOAT_DIGITS: i32 = 14;

/// Canonical lowercase name used as an identity key
pub fn normalize_name(raw: &str) -> String {
    let collapsed = raw
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(collapsed.len() + 4);
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '★' => {
                out.push_str("★ ");
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            '|' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push_str(" | ");
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Map wear abbreviations and spellings onto the five canonical labels
///
/// Unknown values are returned unchanged.
pub fn normalize_wear(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    let canonical = match key.as_str() {
        "fn" | "factory new" | "factory-new" => "Factory New",
        "mw" | "minimal wear" | "minimal-wear" => "Minimal Wear",
        "ft" | "field-tested" | "field tested" => "Field-Tested",
        "ww" | "well-worn" | "well worn" => "Well-Worn",
        "bs" | "battle-scarred" | "battle scarred" => "Battle-Scarred",
        _ => return Some(raw.to_string()),
    };
    Some(canonical.to_string())
}

/// Round a float value to 14 decimal digits
///
/// Non-finite input is treated as absent.
pub fn normalize_float(raw: Option<f64>) -> Option<f64> {
    let value = raw.filter(|v| v.is_finite())?;
    let scale = 10f64.powi(FLOAT_DIGITS);
    // Adding 0.0 folds -0.0 into 0.0
    Some((value * scale).round() / scale + 0.0)
}

/// Normalized identity of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemIdentity {
    pub normalized_name: String,
    pub wear: Option<String>,
    pub float_value: Option<f64>,
}

impl ItemIdentity {
    pub fn of(item: &Item) -> Self {
        Self {
            normalized_name: normalize_name(&item.name),
            wear: normalize_wear(item.wear.as_deref()),
            float_value: normalize_float(item.float_value),
        }
    }

    /// Hashable (name, float) key; `None` when the float is unknown
    pub fn name_float_key(&self) -> Option<(String, u64)> {
        self.float_value
            .map(|f| (self.normalized_name.clone(), (f + 0.0).to_bits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_collapses_formatting() {
        assert_eq!(
            normalize_name("  ★Karambit|Doppler  "),
            "★ karambit | doppler"
        );
        assert_eq!(
            normalize_name("★   Karambit   |   Doppler"),
            "★ karambit | doppler"
        );
        assert_eq!(normalize_name("AK-47 | Redline"), "ak-47 | redline");
        assert_eq!(normalize_name("AK-47  \t|Redline"), "ak-47 | redline");
    }

    #[test]
    fn test_normalize_name_is_idempotent() {
        let once = normalize_name("★ StatTrak™ Butterfly Knife |  Fade");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn test_normalize_wear() {
        assert_eq!(normalize_wear(Some("FT")).as_deref(), Some("Field-Tested"));
        assert_eq!(normalize_wear(Some("field tested")).as_deref(), Some("Field-Tested"));
        assert_eq!(normalize_wear(Some("fn")).as_deref(), Some("Factory New"));
        assert_eq!(normalize_wear(Some("Well Worn")).as_deref(), Some("Well-Worn"));
        assert_eq!(normalize_wear(Some("bs")).as_deref(), Some("Battle-Scarred"));
        assert_eq!(normalize_wear(Some("Minimal Wear")).as_deref(), Some("Minimal Wear"));
        assert_eq!(normalize_wear(Some("Vanilla")).as_deref(), Some("Vanilla"));
        assert_eq!(normalize_wear(Some("  ")), None);
        assert_eq!(normalize_wear(None), None);
    }

    #[test]
    fn test_normalize_float() {
        assert_eq!(normalize_float(None), None);
        assert_eq!(normalize_float(Some(f64::NAN)), None);
        assert_eq!(normalize_float(Some(0.1)), Some(0.1));

        // Serialization noise past the 14th digit collapses
        let a = normalize_float(Some(0.123_456_789_012_341_1)).unwrap();
        let b = normalize_float(Some(0.123_456_789_012_339_9)).unwrap();
        assert_eq!(a, b);

        // Distinct units stay distinct
        let c = normalize_float(Some(0.123_456_789_012_35)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_signed_zero_shares_a_key() {
        let negative = normalize_float(Some(-0.0)).unwrap();
        assert!(negative.is_sign_positive());

        let identity = |float_value: f64| ItemIdentity {
            normalized_name: "p250 | sand dune".to_string(),
            wear: None,
            float_value: Some(float_value),
        };
        assert_eq!(identity(-0.0).name_float_key(), identity(0.0).name_float_key());
    }
}
