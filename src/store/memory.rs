//! In-process store fake. Holds everything in `RwLock`'d vectors and mirrors
//! the SQL implementation's ordering and matching semantics exactly, so the
//! pipeline behaves the same under test as against Postgres.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::catalog::price_join::latest_by_product;
use crate::domain::{
    Category, GeoPoint, Market, MarketSearch, MarketUpdate, NewMarket, NewPriceRecord, PriceQuery,
    PriceRecord, Product, TranslationEntry,
};
use crate::error::{Error, Result};
use crate::store::{
    CategoryStore, Healthcheck, MarketStore, PriceStore, ProductStore, TranslationStore,
};

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    markets: RwLock<Vec<Market>>,
    prices: RwLock<Vec<PriceRecord>>,
    categories: RwLock<Vec<Category>>,
    translations: RwLock<Vec<TranslationEntry>>,
    next_market_key: AtomicI64,
    next_price_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translations have no write endpoint; tests seed them directly.
    pub fn add_translation(&self, entry: TranslationEntry) {
        self.translations.write().expect("lock poisoned").push(entry);
    }

    fn matches_search(market: &Market, filter: &MarketSearch) -> bool {
        filter.city.as_deref().is_none_or(|c| market.city.matches_ci(c))
            && filter.state.as_deref().is_none_or(|s| market.state.matches_ci(s))
            && filter.search.as_deref().is_none_or(|n| market.name.contains_ci(n))
    }
}

fn slice_page<T: Clone>(items: &[T], limit: i64, offset: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn page_by_category(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        let products = self.products.read().expect("lock poisoned");
        let mut matching: Vec<Product> = products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(slice_page(&matching, limit, offset))
    }

    async fn count_by_category(&self, category: Option<&str>) -> Result<i64> {
        let products = self.products.read().expect("lock poisoned");
        Ok(products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .count() as i64)
    }

    async fn insert(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().expect("lock poisoned");
        if products.iter().any(|p| p.id == product.id) {
            return Err(Error::conflict(format!(
                "Product '{}' already exists",
                product.id
            )));
        }
        let mut stored = product.clone();
        stored.name = stored.name.canonical();
        products.push(stored);
        Ok(())
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Market>> {
        let markets = self.markets.read().expect("lock poisoned");
        Ok(markets.iter().find(|m| m.code == code).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Market>> {
        if let Some(market) = self.find_by_code(identifier).await? {
            return Ok(Some(market));
        }
        let Ok(key) = identifier.parse::<i64>() else {
            return Ok(None);
        };
        let markets = self.markets.read().expect("lock poisoned");
        Ok(markets.iter().find(|m| m.key == key).cloned())
    }

    async fn find_by_location(
        &self,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<Market>> {
        let markets = self.markets.read().expect("lock poisoned");
        let mut matching: Vec<Market> = markets
            .iter()
            .filter(|m| {
                city.is_none_or(|c| m.city.matches_ci(c))
                    && state.is_none_or(|s| m.state.matches_ci(s))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.name.primary().to_lowercase(), &a.code)
                .cmp(&(b.name.primary().to_lowercase(), &b.code))
        });
        Ok(matching)
    }

    async fn search(&self, filter: &MarketSearch, limit: i64, offset: i64) -> Result<Vec<Market>> {
        let markets = self.markets.read().expect("lock poisoned");
        let mut matching: Vec<Market> = markets
            .iter()
            .filter(|m| Self::matches_search(m, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let left = (
                a.state.primary().to_lowercase(),
                a.city.primary().to_lowercase(),
                a.name.primary().to_lowercase(),
                a.code.clone(),
            );
            let right = (
                b.state.primary().to_lowercase(),
                b.city.primary().to_lowercase(),
                b.name.primary().to_lowercase(),
                b.code.clone(),
            );
            left.cmp(&right)
        });
        Ok(slice_page(&matching, limit, offset))
    }

    async fn count_search(&self, filter: &MarketSearch) -> Result<i64> {
        let markets = self.markets.read().expect("lock poisoned");
        Ok(markets.iter().filter(|m| Self::matches_search(m, filter)).count() as i64)
    }

    async fn find_nearby(
        &self,
        origin: GeoPoint,
        max_distance_m: f64,
        limit: i64,
    ) -> Result<Vec<Market>> {
        let markets = self.markets.read().expect("lock poisoned");
        let mut within: Vec<(f64, Market)> = markets
            .iter()
            .filter_map(|m| {
                let location = m.location?;
                let distance = origin.distance_meters(&location);
                (distance <= max_distance_m).then(|| (distance, m.clone()))
            })
            .collect();
        within.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.code.cmp(&b.1.code))
        });
        Ok(within
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, m)| m)
            .collect())
    }

    async fn insert(&self, market: &NewMarket) -> Result<Market> {
        let mut markets = self.markets.write().expect("lock poisoned");
        if let Some(existing) = markets.iter().find(|m| m.code == market.id) {
            return Err(Error::conflict(format!(
                "Market '{}' already exists in {}, {}",
                market.id,
                existing.city.primary(),
                existing.state.primary()
            )));
        }
        let now = Utc::now();
        let stored = Market {
            key: self.next_market_key.fetch_add(1, Ordering::SeqCst) + 1,
            code: market.id.clone(),
            name: market.name.canonical(),
            city: market.city.canonical(),
            state: market.state.canonical(),
            address: market.address.clone(),
            contact: market.contact.clone().unwrap_or_default(),
            operating_hours: market.operating_hours.clone(),
            location: market.location,
            created_at: now,
            updated_at: now,
        };
        markets.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, identifier: &str, update: &MarketUpdate) -> Result<Option<Market>> {
        let mut markets = self.markets.write().expect("lock poisoned");
        let found = markets
            .iter_mut()
            .find(|m| m.code == identifier || identifier.parse::<i64>() == Ok(m.key));
        let Some(market) = found else {
            return Ok(None);
        };
        if !update.is_empty() {
            if let Some(name) = &update.name {
                market.name = name.canonical();
            }
            if let Some(city) = &update.city {
                market.city = city.canonical();
            }
            if let Some(state) = &update.state {
                market.state = state.canonical();
            }
            if let Some(address) = &update.address {
                market.address = address.clone();
            }
            if let Some(contact) = &update.contact {
                market.contact = contact.clone();
            }
            if let Some(hours) = &update.operating_hours {
                market.operating_hours = hours.clone();
            }
            if let Some(location) = update.location {
                market.location = Some(location);
            }
            market.updated_at = Utc::now();
        }
        Ok(Some(market.clone()))
    }

    async fn delete(&self, identifier: &str) -> Result<bool> {
        let mut markets = self.markets.write().expect("lock poisoned");
        let before = markets.len();
        markets.retain(|m| !(m.code == identifier || identifier.parse::<i64>() == Ok(m.key)));
        Ok(markets.len() < before)
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn find_for_products(
        &self,
        product_ids: &[String],
        market_code: &str,
    ) -> Result<Vec<PriceRecord>> {
        let prices = self.prices.read().expect("lock poisoned");
        let mut matching: Vec<PriceRecord> = prices
            .iter()
            .filter(|r| r.market_code == market_code && product_ids.contains(&r.product_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(matching)
    }

    async fn latest_in_market(&self, market_code: &str) -> Result<Vec<PriceRecord>> {
        let records: Vec<PriceRecord> = {
            let prices = self.prices.read().expect("lock poisoned");
            prices
                .iter()
                .filter(|r| r.market_code == market_code)
                .cloned()
                .collect()
        };
        let mut latest: Vec<PriceRecord> = latest_by_product(records).into_values().collect();
        latest.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(latest)
    }

    async fn history(
        &self,
        query: &PriceQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PriceRecord>> {
        let prices = self.prices.read().expect("lock poisoned");
        let mut matching: Vec<PriceRecord> = prices
            .iter()
            .filter(|r| {
                query.product_id.as_deref().is_none_or(|p| r.product_id == p)
                    && query.market_code.as_deref().is_none_or(|m| r.market_code == m)
                    && query.start_date.is_none_or(|d| r.date >= d)
                    && query.end_date.is_none_or(|d| r.date <= d)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(slice_page(&matching, limit, offset))
    }

    async fn count_history(&self, query: &PriceQuery) -> Result<i64> {
        let prices = self.prices.read().expect("lock poisoned");
        Ok(prices
            .iter()
            .filter(|r| {
                query.product_id.as_deref().is_none_or(|p| r.product_id == p)
                    && query.market_code.as_deref().is_none_or(|m| r.market_code == m)
                    && query.start_date.is_none_or(|d| r.date >= d)
                    && query.end_date.is_none_or(|d| r.date <= d)
            })
            .count() as i64)
    }

    async fn insert(&self, record: &NewPriceRecord) -> Result<PriceRecord> {
        let stored = PriceRecord {
            id: self.next_price_id.fetch_add(1, Ordering::SeqCst) + 1,
            product_id: record.product_id.clone(),
            market_code: record.market_code.clone(),
            date: record.date,
            unit: record.unit,
            price: record.price,
            available_stock: record.available_stock,
            created_at: Utc::now(),
        };
        self.prices.write().expect("lock poisoned").push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn all(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().expect("lock poisoned");
        let mut all: Vec<Category> = categories.to_vec();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(all)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Category>> {
        let categories = self.categories.read().expect("lock poisoned");
        Ok(categories.iter().find(|c| c.key == key).cloned())
    }

    async fn insert(&self, category: &Category) -> Result<()> {
        let mut categories = self.categories.write().expect("lock poisoned");
        if categories.iter().any(|c| c.key == category.key) {
            return Err(Error::conflict(format!(
                "Category '{}' already exists",
                category.key
            )));
        }
        let mut stored = category.clone();
        stored.name = stored.name.canonical();
        stored.description = stored.description.canonical();
        categories.push(stored);
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn all(&self) -> Result<Vec<TranslationEntry>> {
        let translations = self.translations.read().expect("lock poisoned");
        let mut all: Vec<TranslationEntry> = translations.to_vec();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(all)
    }
}

#[async_trait]
impl Healthcheck for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
