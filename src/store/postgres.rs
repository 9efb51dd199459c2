//! sqlx/PostgreSQL implementation of the store traits. One `PgStore` backs
//! all of them; bilingual fields live in JSONB columns in the canonical
//! `{en, hi?}` shape, so `->>` lookups by language key always work.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::instrument;

use crate::domain::{
    Category, GeoPoint, LocalizedText, Market, MarketSearch, MarketUpdate, NewMarket,
    NewPriceRecord, PriceQuery, PriceRecord, Product, TranslationEntry, Unit,
};
use crate::error::{Error, Result};
use crate::store::db::Db;
use crate::store::{
    CategoryStore, Healthcheck, MarketStore, PriceStore, ProductStore, TranslationStore,
};

#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: Json<LocalizedText>,
    category: String,
    kind: Option<String>,
    image: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name.0,
            category: row.category,
            kind: row.kind,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MarketRow {
    pk: i64,
    code: String,
    name: Json<LocalizedText>,
    city: Json<LocalizedText>,
    state: Json<LocalizedText>,
    address: String,
    contact: String,
    operating_hours: String,
    longitude: Option<f64>,
    latitude: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MarketRow> for Market {
    fn from(row: MarketRow) -> Self {
        let location = match (row.longitude, row.latitude) {
            (Some(longitude), Some(latitude)) => Some(GeoPoint {
                longitude,
                latitude,
            }),
            _ => None,
        };
        Market {
            key: row.pk,
            code: row.code,
            name: row.name.0,
            city: row.city.0,
            state: row.state.0,
            address: row.address,
            contact: row.contact,
            operating_hours: row.operating_hours,
            location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PriceRow {
    id: i64,
    product_id: String,
    market_code: String,
    date: NaiveDate,
    unit: String,
    price: f64,
    available_stock: f64,
    created_at: DateTime<Utc>,
}

impl From<PriceRow> for PriceRecord {
    fn from(row: PriceRow) -> Self {
        PriceRecord {
            id: row.id,
            product_id: row.product_id,
            market_code: row.market_code,
            date: row.date,
            // the column has a CHECK against the same vocabulary
            unit: Unit::parse(&row.unit).unwrap_or_default(),
            price: row.price,
            available_stock: row.available_stock,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    key: String,
    name: Json<LocalizedText>,
    description: Json<LocalizedText>,
    category_img: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            key: row.key,
            name: row.name.0,
            description: row.description.0,
            category_img: row.category_img,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TranslationRow {
    key: String,
    en: String,
    hi: Option<String>,
}

impl From<TranslationRow> for TranslationEntry {
    fn from(row: TranslationRow) -> Self {
        TranslationEntry {
            key: row.key,
            en: row.en,
            hi: row.hi,
        }
    }
}

const MARKET_COLUMNS: &str = "pk, code, name, city, state, address, contact, operating_hours, \
                              longitude, latitude, created_at, updated_at";

#[async_trait]
impl ProductStore for PgStore {
    async fn page_by_category(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        let q = r#"
            SELECT id, name, category, kind, image, created_at
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
        "#;
        let rows = sqlx::query_as::<_, ProductRow>(q)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count_by_category(&self, category: Option<&str>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(count)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert(&self, product: &Product) -> Result<()> {
        let q = r#"
            INSERT INTO products (id, name, category, kind, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
        "#;
        let result = sqlx::query(q)
            .bind(&product.id)
            .bind(Json(product.name.canonical()))
            .bind(&product.category)
            .bind(&product.kind)
            .bind(&product.image)
            .bind(product.created_at)
            .execute(&self.db.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::conflict(format!(
                "Product '{}' already exists",
                product.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Market>> {
        let q = format!("SELECT {MARKET_COLUMNS} FROM markets WHERE code = $1");
        let row = sqlx::query_as::<_, MarketRow>(&q)
            .bind(code)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.map(Market::from))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Market>> {
        if let Some(market) = self.find_by_code(identifier).await? {
            return Ok(Some(market));
        }
        let Ok(key) = identifier.parse::<i64>() else {
            return Ok(None);
        };
        let q = format!("SELECT {MARKET_COLUMNS} FROM markets WHERE pk = $1");
        let row = sqlx::query_as::<_, MarketRow>(&q)
            .bind(key)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.map(Market::from))
    }

    async fn find_by_location(
        &self,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<Market>> {
        let q = format!(
            r#"
            SELECT {MARKET_COLUMNS}
            FROM markets
            WHERE ($1::text IS NULL
                   OR lower(city->>'en') = lower($1)
                   OR lower(city->>'hi') = lower($1))
              AND ($2::text IS NULL
                   OR lower(state->>'en') = lower($2)
                   OR lower(state->>'hi') = lower($2))
            ORDER BY lower(name->>'en'), code
        "#
        );
        let rows = sqlx::query_as::<_, MarketRow>(&q)
            .bind(city)
            .bind(state)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(Market::from).collect())
    }

    async fn search(&self, filter: &MarketSearch, limit: i64, offset: i64) -> Result<Vec<Market>> {
        let q = format!(
            r#"
            SELECT {MARKET_COLUMNS}
            FROM markets
            WHERE ($1::text IS NULL
                   OR lower(city->>'en') = lower($1)
                   OR lower(city->>'hi') = lower($1))
              AND ($2::text IS NULL
                   OR lower(state->>'en') = lower($2)
                   OR lower(state->>'hi') = lower($2))
              AND ($3::text IS NULL
                   OR name->>'en' ILIKE '%' || $3 || '%'
                   OR name->>'hi' ILIKE '%' || $3 || '%')
            ORDER BY lower(state->>'en'), lower(city->>'en'), lower(name->>'en'), code
            LIMIT $4 OFFSET $5
        "#
        );
        let rows = sqlx::query_as::<_, MarketRow>(&q)
            .bind(filter.city.as_deref())
            .bind(filter.state.as_deref())
            .bind(filter.search.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(Market::from).collect())
    }

    async fn count_search(&self, filter: &MarketSearch) -> Result<i64> {
        let q = r#"
            SELECT COUNT(*)
            FROM markets
            WHERE ($1::text IS NULL
                   OR lower(city->>'en') = lower($1)
                   OR lower(city->>'hi') = lower($1))
              AND ($2::text IS NULL
                   OR lower(state->>'en') = lower($2)
                   OR lower(state->>'hi') = lower($2))
              AND ($3::text IS NULL
                   OR name->>'en' ILIKE '%' || $3 || '%'
                   OR name->>'hi' ILIKE '%' || $3 || '%')
        "#;
        let count = sqlx::query_scalar::<_, i64>(q)
            .bind(filter.city.as_deref())
            .bind(filter.state.as_deref())
            .bind(filter.search.as_deref())
            .fetch_one(&self.db.pool)
            .await?;
        Ok(count)
    }

    async fn find_nearby(
        &self,
        origin: GeoPoint,
        max_distance_m: f64,
        limit: i64,
    ) -> Result<Vec<Market>> {
        // Haversine in SQL; markets without a stored location never match.
        let q = format!(
            r#"
            SELECT {MARKET_COLUMNS}
            FROM (
                SELECT m.*,
                       2 * 6371000 * asin(sqrt(
                           power(sin(radians(m.latitude - $2) / 2), 2)
                           + cos(radians($2)) * cos(radians(m.latitude))
                             * power(sin(radians(m.longitude - $1) / 2), 2)
                       )) AS distance_m
                FROM markets m
                WHERE m.longitude IS NOT NULL AND m.latitude IS NOT NULL
            ) nearby
            WHERE distance_m <= $3
            ORDER BY distance_m, code
            LIMIT $4
        "#
        );
        let rows = sqlx::query_as::<_, MarketRow>(&q)
            .bind(origin.longitude)
            .bind(origin.latitude)
            .bind(max_distance_m)
            .bind(limit)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(Market::from).collect())
    }

    #[instrument(skip(self, market), fields(code = %market.id))]
    async fn insert(&self, market: &NewMarket) -> Result<Market> {
        let q = format!(
            r#"
            INSERT INTO markets (code, name, city, state, address, contact,
                                 operating_hours, longitude, latitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (code) DO NOTHING
            RETURNING {MARKET_COLUMNS}
        "#
        );
        let row = sqlx::query_as::<_, MarketRow>(&q)
            .bind(&market.id)
            .bind(Json(market.name.canonical()))
            .bind(Json(market.city.canonical()))
            .bind(Json(market.state.canonical()))
            .bind(&market.address)
            .bind(market.contact.clone().unwrap_or_default())
            .bind(&market.operating_hours)
            .bind(market.location.map(|p| p.longitude))
            .bind(market.location.map(|p| p.latitude))
            .fetch_optional(&self.db.pool)
            .await?;
        match row {
            Some(row) => Ok(row.into()),
            None => {
                let message = match self.find_by_code(&market.id).await? {
                    Some(existing) => format!(
                        "Market '{}' already exists in {}, {}",
                        market.id,
                        existing.city.primary(),
                        existing.state.primary()
                    ),
                    None => format!("Market '{}' already exists", market.id),
                };
                Err(Error::conflict(message))
            }
        }
    }

    #[instrument(skip(self, update))]
    async fn update(&self, identifier: &str, update: &MarketUpdate) -> Result<Option<Market>> {
        let Some(existing) = self.find_by_identifier(identifier).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(existing));
        }

        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE markets SET updated_at = now()");
        if let Some(name) = &update.name {
            qb.push(", name = ");
            qb.push_bind(Json(name.canonical()));
        }
        if let Some(city) = &update.city {
            qb.push(", city = ");
            qb.push_bind(Json(city.canonical()));
        }
        if let Some(state) = &update.state {
            qb.push(", state = ");
            qb.push_bind(Json(state.canonical()));
        }
        if let Some(address) = &update.address {
            qb.push(", address = ");
            qb.push_bind(address);
        }
        if let Some(contact) = &update.contact {
            qb.push(", contact = ");
            qb.push_bind(contact);
        }
        if let Some(hours) = &update.operating_hours {
            qb.push(", operating_hours = ");
            qb.push_bind(hours);
        }
        if let Some(location) = update.location {
            qb.push(", longitude = ");
            qb.push_bind(location.longitude);
            qb.push(", latitude = ");
            qb.push_bind(location.latitude);
        }
        qb.push(" WHERE pk = ");
        qb.push_bind(existing.key);
        qb.push(format!(" RETURNING {MARKET_COLUMNS}"));

        let row = qb
            .build_query_as::<MarketRow>()
            .fetch_one(&self.db.pool)
            .await?;
        Ok(Some(row.into()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, identifier: &str) -> Result<bool> {
        let Some(existing) = self.find_by_identifier(identifier).await? else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM markets WHERE pk = $1")
            .bind(existing.key)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PriceStore for PgStore {
    async fn find_for_products(
        &self,
        product_ids: &[String],
        market_code: &str,
    ) -> Result<Vec<PriceRecord>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = r#"
            SELECT id, product_id, market_code, date, unit, price, available_stock, created_at
            FROM price_records
            WHERE market_code = $1 AND product_id = ANY($2)
            ORDER BY date DESC, id DESC
        "#;
        let rows = sqlx::query_as::<_, PriceRow>(q)
            .bind(market_code)
            .bind(product_ids)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    async fn latest_in_market(&self, market_code: &str) -> Result<Vec<PriceRecord>> {
        // DISTINCT ON picks the newest record per product; date ties fall to
        // the highest id, i.e. the latest insertion.
        let q = r#"
            SELECT DISTINCT ON (product_id)
                   id, product_id, market_code, date, unit, price, available_stock, created_at
            FROM price_records
            WHERE market_code = $1
            ORDER BY product_id, date DESC, id DESC
        "#;
        let rows = sqlx::query_as::<_, PriceRow>(q)
            .bind(market_code)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    async fn history(
        &self,
        query: &PriceQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PriceRecord>> {
        let q = r#"
            SELECT id, product_id, market_code, date, unit, price, available_stock, created_at
            FROM price_records
            WHERE ($1::text IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR market_code = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
            ORDER BY date DESC, id DESC
            LIMIT $5 OFFSET $6
        "#;
        let rows = sqlx::query_as::<_, PriceRow>(q)
            .bind(query.product_id.as_deref())
            .bind(query.market_code.as_deref())
            .bind(query.start_date)
            .bind(query.end_date)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    async fn count_history(&self, query: &PriceQuery) -> Result<i64> {
        let q = r#"
            SELECT COUNT(*)
            FROM price_records
            WHERE ($1::text IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR market_code = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
        "#;
        let count = sqlx::query_scalar::<_, i64>(q)
            .bind(query.product_id.as_deref())
            .bind(query.market_code.as_deref())
            .bind(query.start_date)
            .bind(query.end_date)
            .fetch_one(&self.db.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, record), fields(product_id = %record.product_id, market = %record.market_code))]
    async fn insert(&self, record: &NewPriceRecord) -> Result<PriceRecord> {
        let q = r#"
            INSERT INTO price_records (product_id, market_code, date, unit, price, available_stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, product_id, market_code, date, unit, price, available_stock, created_at
        "#;
        let row = sqlx::query_as::<_, PriceRow>(q)
            .bind(&record.product_id)
            .bind(&record.market_code)
            .bind(record.date)
            .bind(record.unit.as_str())
            .bind(record.price)
            .bind(record.available_stock)
            .fetch_one(&self.db.pool)
            .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn all(&self) -> Result<Vec<Category>> {
        let q = r#"
            SELECT key, name, description, category_img, created_at
            FROM categories
            ORDER BY key
        "#;
        let rows = sqlx::query_as::<_, CategoryRow>(q)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Category>> {
        let q = r#"
            SELECT key, name, description, category_img, created_at
            FROM categories
            WHERE key = $1
        "#;
        let row = sqlx::query_as::<_, CategoryRow>(q)
            .bind(key)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.map(Category::from))
    }

    #[instrument(skip(self, category), fields(key = %category.key))]
    async fn insert(&self, category: &Category) -> Result<()> {
        let q = r#"
            INSERT INTO categories (key, name, description, category_img, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (key) DO NOTHING
        "#;
        let result = sqlx::query(q)
            .bind(&category.key)
            .bind(Json(category.name.canonical()))
            .bind(Json(category.description.canonical()))
            .bind(&category.category_img)
            .bind(category.created_at)
            .execute(&self.db.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::conflict(format!(
                "Category '{}' already exists",
                category.key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn all(&self) -> Result<Vec<TranslationEntry>> {
        let q = "SELECT key, en, hi FROM translations ORDER BY key";
        let rows = sqlx::query_as::<_, TranslationRow>(q)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.into_iter().map(TranslationEntry::from).collect())
    }
}

#[async_trait]
impl Healthcheck for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(&self.db.pool)
            .await?;
        Ok(())
    }
}
