//! Storage interfaces and their two implementations.
//!
//! The catalog pipeline and the HTTP handlers only ever see these traits;
//! `PgStore` backs them in production and `MemoryStore` stands in for tests.
//! Each trait exposes a small closed set of queries rather than a generic
//! filter surface, so every query shape is named and independently testable.

pub mod db;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Category, GeoPoint, Market, MarketSearch, MarketUpdate, NewMarket, NewPriceRecord, PriceQuery,
    PriceRecord, Product, TranslationEntry,
};
use crate::error::Result;

pub use db::Db;
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// One listing page, filtered by exact category key when given, in the
    /// stable `(created_at, id)` order.
    async fn page_by_category(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>>;

    /// Total count for the same filter, independent of pagination.
    async fn count_by_category(&self, category: Option<&str>) -> Result<i64>;

    async fn insert(&self, product: &Product) -> Result<()>;
}

#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Exact lookup by the portable external code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Market>>;

    /// Lookup by external code first, then by internal storage key when the
    /// identifier parses as one. Callers may hold either.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Market>>;

    /// All markets matching the city and/or state hints, case-insensitively
    /// across both stored languages, ordered by lowercased primary name then
    /// code. At least one hint must be given.
    async fn find_by_location(
        &self,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<Market>>;

    /// Paginated directory listing ordered by state, city, name.
    async fn search(&self, filter: &MarketSearch, limit: i64, offset: i64) -> Result<Vec<Market>>;

    async fn count_search(&self, filter: &MarketSearch) -> Result<i64>;

    /// Markets with a stored location within `max_distance_m` meters of the
    /// origin, nearest first.
    async fn find_nearby(
        &self,
        origin: GeoPoint,
        max_distance_m: f64,
        limit: i64,
    ) -> Result<Vec<Market>>;

    /// Inserts a market; duplicate external code is a conflict naming the
    /// existing market's city and state.
    async fn insert(&self, market: &NewMarket) -> Result<Market>;

    /// Partial update; the external code itself is immutable. `None` when
    /// the identifier matches nothing.
    async fn update(&self, identifier: &str, update: &MarketUpdate) -> Result<Option<Market>>;

    /// `true` when a market was removed. Price history rows are kept; they
    /// key on the external code, not the deleted row.
    async fn delete(&self, identifier: &str) -> Result<bool>;
}

#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Every record for the given products in the given market, ordered
    /// date DESC then id DESC.
    async fn find_for_products(
        &self,
        product_ids: &[String],
        market_code: &str,
    ) -> Result<Vec<PriceRecord>>;

    /// The single latest record per product in a market, ordered by product
    /// id. Unknown market codes simply yield nothing.
    async fn latest_in_market(&self, market_code: &str) -> Result<Vec<PriceRecord>>;

    /// Raw history, newest first, filtered and paginated.
    async fn history(&self, query: &PriceQuery, limit: i64, offset: i64)
        -> Result<Vec<PriceRecord>>;

    async fn count_history(&self, query: &PriceQuery) -> Result<i64>;

    async fn insert(&self, record: &NewPriceRecord) -> Result<PriceRecord>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Full category list ordered by key.
    async fn all(&self) -> Result<Vec<Category>>;

    async fn find_by_key(&self, key: &str) -> Result<Option<Category>>;

    async fn insert(&self, category: &Category) -> Result<()>;
}

#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn all(&self) -> Result<Vec<TranslationEntry>>;
}

#[async_trait]
pub trait Healthcheck: Send + Sync {
    /// Cheap connectivity probe for readiness reporting.
    async fn ping(&self) -> Result<()>;
}

/// The bundle handlers receive as shared app data. Cloning is cheap; all
/// members are shared references to one underlying store.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub markets: Arc<dyn MarketStore>,
    pub prices: Arc<dyn PriceStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub translations: Arc<dyn TranslationStore>,
    pub health: Arc<dyn Healthcheck>,
}

impl Stores {
    pub fn postgres(db: Db) -> Self {
        Self::from_postgres(Arc::new(PgStore::new(db)))
    }

    pub fn from_postgres(store: Arc<PgStore>) -> Self {
        Self {
            products: store.clone(),
            markets: store.clone(),
            prices: store.clone(),
            categories: store.clone(),
            translations: store.clone(),
            health: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            products: store.clone(),
            markets: store.clone(),
            prices: store.clone(),
            categories: store.clone(),
            translations: store.clone(),
            health: store,
        }
    }
}
