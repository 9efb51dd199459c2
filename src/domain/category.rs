use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::text::LocalizedText;

/// The fixed category vocabulary. Products reference these keys; the set
/// only grows by deliberate schema change, not by API traffic.
pub const CATEGORY_KEYS: &[&str] = &[
    "vegetables",
    "fruits",
    "milk",
    "milk-products",
    "grains",
    "seed",
    "nursery-plants",
    "fertilizer",
    "dry-fruits",
];

pub fn is_valid_category_key(key: &str) -> bool {
    CATEGORY_KEYS.contains(&key)
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub key: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    #[serde(rename = "categoryImg")]
    pub category_img: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a category row for one of the fixed keys.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub key: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    #[serde(rename = "categoryImg", default)]
    pub category_img: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_accepts_known_keys_only() {
        assert!(is_valid_category_key("vegetables"));
        assert!(is_valid_category_key("milk-products"));
        assert!(!is_valid_category_key("Vegetables"));
        assert!(!is_valid_category_key("electronics"));
        assert!(!is_valid_category_key(""));
    }

    #[test]
    fn category_serializes_image_field_in_camel_case() {
        let category = Category {
            key: "fruits".into(),
            name: LocalizedText::bilingual("Fruits", "फल"),
            description: LocalizedText::plain("Fresh fruit").canonical(),
            category_img: "fruits.png".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["categoryImg"], "fruits.png");
        assert!(value.get("category_img").is_none());
    }
}
