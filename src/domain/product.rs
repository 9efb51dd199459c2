use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::text::LocalizedText;

/// A catalog product. Names are bilingual; `category` references the fixed
/// category vocabulary and `kind` is the free-form subtype within it
/// (wire name `type`, e.g. "leafy" under "vegetables").
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub name: LocalizedText,
    pub category: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub image: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a product to the catalog. Callers may bring their own
/// id (catalog imports do); otherwise one is minted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub id: Option<String>,
    pub name: LocalizedText,
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.primary().trim().is_empty() {
            return Err("name must have a non-empty primary entry".into());
        }
        if self.category.trim().is_empty() {
            return Err("category must not be empty".into());
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err("id must not be blank when supplied".into());
            }
        }
        Ok(())
    }

    /// Mints the stored product, keeping a supplied id and canonicalizing
    /// the name for storage.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name.canonical(),
            category: self.category,
            kind: self.kind,
            image: self.image.unwrap_or_default(),
            created_at: now,
        }
    }
}
