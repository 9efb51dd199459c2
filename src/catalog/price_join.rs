use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Market, PriceRecord, Unit};
use crate::error::Result;
use crate::store::PriceStore;

/// The latest observation for one product in the resolved market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub price: f64,
    pub stock: f64,
    pub unit: Unit,
    #[serde(rename = "observedAt")]
    pub observed_at: NaiveDate,
}

impl From<PriceRecord> for PriceQuote {
    fn from(record: PriceRecord) -> Self {
        PriceQuote {
            price: record.price,
            stock: record.available_stock,
            unit: record.unit,
            observed_at: record.date,
        }
    }
}

/// Reduces a record set to the newest record per product. Date ties fall to
/// the greatest record id, i.e. the latest insertion. The fold is
/// order-independent, so the SQL and in-memory stores agree on the winner.
pub fn latest_by_product(records: Vec<PriceRecord>) -> HashMap<String, PriceRecord> {
    let mut latest: HashMap<String, PriceRecord> = HashMap::new();
    for record in records {
        match latest.entry(record.product_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let held = slot.get();
                if (record.date, record.id) > (held.date, held.id) {
                    slot.insert(record);
                }
            }
        }
    }
    latest
}

/// Joins the newest price per product against the selected market. No market
/// means no quotes; products without any record in the market are simply
/// absent from the map, and the caller renders them with null price fields.
pub async fn attach_latest_prices(
    prices: &dyn PriceStore,
    product_ids: &[String],
    market: Option<&Market>,
) -> Result<HashMap<String, PriceQuote>> {
    let Some(market) = market else {
        return Ok(HashMap::new());
    };
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let records = prices.find_for_products(product_ids, &market.code).await?;
    Ok(latest_by_product(records)
        .into_iter()
        .map(|(product_id, record)| (product_id, record.into()))
        .collect())
}
