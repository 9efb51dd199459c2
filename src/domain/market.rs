use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::text::LocalizedText;

/// Mean earth radius in meters, for haversine distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Great-circle distance to another point, in meters (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }
}

/// A physical wholesale market. `key` is the storage-internal row key and is
/// never serialized; `code` is the portable external identifier that clients
/// and price records use (wire name `id`, as the original API called it).
#[derive(Debug, Clone, Serialize)]
pub struct Market {
    #[serde(skip)]
    pub key: i64,
    #[serde(rename = "id")]
    pub code: String,
    pub name: LocalizedText,
    pub city: LocalizedText,
    pub state: LocalizedText,
    pub address: String,
    pub contact: String,
    #[serde(rename = "operatingHours")]
    pub operating_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for registering a market. `id` is the external code.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMarket {
    pub id: String,
    pub name: LocalizedText,
    pub city: LocalizedText,
    pub state: LocalizedText,
    pub address: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(rename = "operatingHours")]
    pub operating_hours: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Partial update for a market. The external code itself is immutable:
/// price history keys on it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketUpdate {
    pub name: Option<LocalizedText>,
    pub city: Option<LocalizedText>,
    pub state: Option<LocalizedText>,
    pub address: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "operatingHours")]
    pub operating_hours: Option<String>,
    pub location: Option<GeoPoint>,
}

impl MarketUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.address.is_none()
            && self.contact.is_none()
            && self.operating_hours.is_none()
            && self.location.is_none()
    }
}

impl NewMarket {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".into());
        }
        if self.name.primary().trim().is_empty() {
            return Err("name must have a non-empty primary entry".into());
        }
        if self.city.primary().trim().is_empty() {
            return Err("city must have a non-empty primary entry".into());
        }
        if self.state.primary().trim().is_empty() {
            return Err("state must have a non-empty primary entry".into());
        }
        if self.address.trim().is_empty() {
            return Err("address must not be empty".into());
        }
        if self.operating_hours.trim().is_empty() {
            return Err("operatingHours must not be empty".into());
        }
        Ok(())
    }
}

/// Filters for the paginated market listing.
#[derive(Debug, Clone, Default)]
pub struct MarketSearch {
    /// Case-insensitive match against either language of the stored city.
    pub city: Option<String>,
    /// Case-insensitive match against either language of the stored state.
    pub state: Option<String>,
    /// Case-insensitive substring match against either language of the name.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_distance_is_roughly_right_for_known_cities() {
        // Pune to Mumbai is about 120 km as the crow flies.
        let pune = GeoPoint {
            longitude: 73.8567,
            latitude: 18.5204,
        };
        let mumbai = GeoPoint {
            longitude: 72.8777,
            latitude: 19.0760,
        };
        let d = pune.distance_meters(&mumbai);
        assert!((100_000.0..140_000.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn zero_distance_for_identical_points() {
        let p = GeoPoint {
            longitude: 73.8567,
            latitude: 18.5204,
        };
        assert_eq!(p.distance_meters(&p), 0.0);
    }

    #[test]
    fn market_serializes_code_as_id_and_hides_storage_key() {
        let market = Market {
            key: 7,
            code: "PUNE-001".into(),
            name: LocalizedText::plain("Pune APMC").canonical(),
            city: LocalizedText::bilingual("Pune", "पुणे"),
            state: LocalizedText::bilingual("Maharashtra", "महाराष्ट्र"),
            address: "Market Yard, Gultekdi".into(),
            contact: String::new(),
            operating_hours: "06:00-20:00".into(),
            location: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&market).unwrap();
        assert_eq!(value["id"], "PUNE-001");
        assert!(value.get("key").is_none());
        assert!(value.get("pk").is_none());
    }
}
