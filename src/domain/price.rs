use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade units a price can be quoted in. Mirrors the units the field teams
/// actually report from mandis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Kg,
    G,
    Ton,
    Quintal,
    Bag,
    Liter,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::Ton => "ton",
            Unit::Quintal => "quintal",
            Unit::Bag => "bag",
            Unit::Liter => "liter",
        }
    }

    pub fn parse(raw: &str) -> Option<Unit> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kg" => Some(Unit::Kg),
            "g" => Some(Unit::G),
            "ton" => Some(Unit::Ton),
            "quintal" => Some(Unit::Quintal),
            "bag" => Some(Unit::Bag),
            "liter" => Some(Unit::Liter),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed price for a product at a market on a given day. History is
/// append-only; corrections land as new rows and the newest row wins.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    pub id: i64,
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "market")]
    pub market_code: String,
    pub date: NaiveDate,
    pub unit: Unit,
    /// Rupees per unit.
    pub price: f64,
    #[serde(rename = "availableStock")]
    pub available_stock: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a price observation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPriceRecord {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "market")]
    pub market_code: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub unit: Unit,
    pub price: f64,
    #[serde(rename = "availableStock", default)]
    pub available_stock: f64,
}

impl NewPriceRecord {
    /// Field-level validation; storage enforces the same floors.
    pub fn validate(&self) -> Result<(), String> {
        if self.product_id.trim().is_empty() {
            return Err("productId must not be empty".into());
        }
        if self.market_code.trim().is_empty() {
            return Err("market must not be empty".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".into());
        }
        if !self.available_stock.is_finite() || self.available_stock < 0.0 {
            return Err("availableStock must be a non-negative number".into());
        }
        Ok(())
    }
}

/// Filters for listing raw price history.
#[derive(Debug, Clone, Default)]
pub struct PriceQuery {
    pub product_id: Option<String>,
    pub market_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_round_trips_through_lowercase_json() {
        for (unit, text) in [
            (Unit::Kg, "\"kg\""),
            (Unit::Quintal, "\"quintal\""),
            (Unit::Liter, "\"liter\""),
        ] {
            assert_eq!(serde_json::to_string(&unit).unwrap(), text);
            let back: Unit = serde_json::from_str(text).unwrap();
            assert_eq!(back, unit);
        }
    }

    #[test]
    fn unit_parse_is_case_insensitive_and_rejects_unknowns() {
        assert_eq!(Unit::parse("KG"), Some(Unit::Kg));
        assert_eq!(Unit::parse(" bag "), Some(Unit::Bag));
        assert_eq!(Unit::parse("pound"), None);
    }

    #[test]
    fn new_record_defaults_unit_to_kg() {
        let record: NewPriceRecord = serde_json::from_str(
            r#"{"productId":"p1","market":"PUNE-001","date":"2026-08-20","price":32.5}"#,
        )
        .unwrap();
        assert_eq!(record.unit, Unit::Kg);
        assert_eq!(record.available_stock, 0.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validation_rejects_negative_amounts() {
        let mut record = NewPriceRecord {
            product_id: "p1".into(),
            market_code: "PUNE-001".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            unit: Unit::Kg,
            price: -1.0,
            available_stock: 0.0,
        };
        assert!(record.validate().is_err());
        record.price = 10.0;
        record.available_stock = -5.0;
        assert!(record.validate().is_err());
        record.available_stock = 5.0;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validation_rejects_blank_identifiers() {
        let record = NewPriceRecord {
            product_id: "  ".into(),
            market_code: "PUNE-001".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            unit: Unit::Kg,
            price: 10.0,
            available_stock: 0.0,
        };
        assert!(record.validate().is_err());
    }
}
