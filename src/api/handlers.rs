// HTTP request handlers for API endpoints

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Instant;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};

use crate::api::models::*;
use crate::catalog::{self, CatalogRequest, PageParams};
use crate::domain::{
    is_valid_category_key, Category, GeoPoint, Language, MarketSearch, MarketUpdate, NewCategory,
    NewMarket, NewPriceRecord, NewProduct, PriceQuery, CATEGORY_KEYS,
};
use crate::error::{Error, Result};
use crate::store::Stores;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Records the process start for uptime reporting. Called once by the
/// server; calling again is a no-op.
pub fn mark_started() {
    let _ = STARTED_AT.set(Instant::now());
}

/// Health check endpoint
pub async fn health_check(stores: web::Data<Stores>) -> Result<HttpResponse> {
    let database = match stores.health.ping().await {
        Ok(()) => "connected",
        Err(err) => {
            tracing::warn!(error = %err, "health ping failed");
            "disconnected"
        }
    };
    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    let uptime = STARTED_AT.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    let response = ApiResponse::success(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        uptime_seconds: uptime,
    });

    Ok(HttpResponse::Ok().json(response))
}

/// The catalog listing: location-scoped, price-joined, localized, paginated.
pub async fn list_catalog(
    stores: web::Data<Stores>,
    query: web::Query<CatalogQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let request = CatalogRequest {
        category: query.category,
        market: query.market,
        city: query.city,
        state: query.state,
        language: Language::from_code(query.lang.as_deref()),
        pagination: PageParams::from_raw(query.page.as_deref(), query.limit.as_deref()),
    };

    let page = catalog::list_products(&stores, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

/// Add a product to the catalog
pub async fn create_product(
    stores: web::Data<Stores>,
    payload: web::Json<NewProduct>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    payload.validate().map_err(Error::validation)?;

    if stores.categories.find_by_key(&payload.category).await?.is_none() {
        return Err(Error::validation(format!(
            "unknown category '{}'",
            payload.category
        )));
    }

    let product = payload.into_product(Utc::now());
    stores.products.insert(&product).await?;

    tracing::info!(product_id = %product.id, category = %product.category, "product created");
    Ok(HttpResponse::Created().json(ApiResponse::success(product)))
}

/// Market directory, filtered and paginated
pub async fn list_markets(
    stores: web::Data<Stores>,
    query: web::Query<MarketListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = PageParams::from_raw(query.page.as_deref(), query.limit.as_deref());
    let filter = MarketSearch {
        city: query.city,
        state: query.state,
        search: query.search,
    };

    let (markets, total) = tokio::try_join!(
        stores.markets.search(&filter, page.limit, page.offset()),
        stores.markets.count_search(&filter),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(markets, &page, total)))
}

/// Register a market
pub async fn create_market(
    stores: web::Data<Stores>,
    payload: web::Json<NewMarket>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    payload.validate().map_err(Error::validation)?;

    let market = stores.markets.insert(&payload).await?;

    tracing::info!(market = %market.code, "market created");
    Ok(HttpResponse::Created().json(ApiResponse::success(market)))
}

const DEFAULT_NEARBY_DISTANCE_M: f64 = 5000.0;
const DEFAULT_NEARBY_LIMIT: i64 = 20;

/// Markets within reach of a point, nearest first
pub async fn nearby_markets(
    stores: web::Data<Stores>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let origin = GeoPoint {
        longitude: parse_coordinate(query.longitude.as_deref(), "longitude")?,
        latitude: parse_coordinate(query.latitude.as_deref(), "latitude")?,
    };

    // Distance and limit are forgiving; the coordinates are not.
    let max_distance = query
        .max_distance
        .as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(DEFAULT_NEARBY_DISTANCE_M);
    let limit = query
        .limit
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_NEARBY_LIMIT);

    let markets = stores.markets.find_nearby(origin, max_distance, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(markets)))
}

/// Single market by code or internal key
pub async fn get_market(
    stores: web::Data<Stores>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let market = stores
        .markets
        .find_by_identifier(&path)
        .await?
        .ok_or(Error::NotFound("market"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(market)))
}

/// Partial market update; the external code itself never changes
pub async fn update_market(
    stores: web::Data<Stores>,
    path: web::Path<String>,
    payload: web::Json<MarketUpdate>,
) -> Result<HttpResponse> {
    let market = stores
        .markets
        .update(&path, &payload.into_inner())
        .await?
        .ok_or(Error::NotFound("market"))?;

    tracing::info!(market = %market.code, "market updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success(market)))
}

pub async fn delete_market(
    stores: web::Data<Stores>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if !stores.markets.delete(&path).await? {
        return Err(Error::NotFound("market"));
    }
    tracing::info!(market = %path.as_str(), "market deleted");
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

/// Raw price history, newest first
pub async fn list_prices(
    stores: web::Data<Stores>,
    query: web::Query<PriceListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = PageParams::from_raw(query.page.as_deref(), query.limit.as_deref());
    let filter = PriceQuery {
        product_id: query.product_id,
        market_code: query.market,
        start_date: parse_date_opt(query.start_date.as_deref(), "start_date")?,
        end_date: parse_date_opt(query.end_date.as_deref(), "end_date")?,
    };

    let (records, total) = tokio::try_join!(
        stores.prices.history(&filter, page.limit, page.offset()),
        stores.prices.count_history(&filter),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(records, &page, total)))
}

/// Record a price observation
pub async fn create_price(
    stores: web::Data<Stores>,
    payload: web::Json<NewPriceRecord>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    payload.validate().map_err(Error::validation)?;

    let record = stores.prices.insert(&payload).await?;

    tracing::info!(
        product_id = %record.product_id,
        market = %record.market_code,
        price = record.price,
        "price recorded"
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(record)))
}

/// Latest record per product in one market. An unknown market code is just
/// an empty history, not an error.
pub async fn latest_market_prices(
    stores: web::Data<Stores>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let records = stores.prices.latest_in_market(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}

/// Full category list
pub async fn list_categories(stores: web::Data<Stores>) -> Result<HttpResponse> {
    let categories = stores.categories.all().await?;
    let response = ApiResponse::success(serde_json::json!({
        "count": categories.len(),
        "categories": categories,
    }));
    Ok(HttpResponse::Ok().json(response))
}

/// Register a category row for one of the fixed keys
pub async fn create_category(
    stores: web::Data<Stores>,
    payload: web::Json<NewCategory>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    if !is_valid_category_key(&payload.key) {
        return Err(Error::validation(format!(
            "key must be one of: {}",
            CATEGORY_KEYS.join(", ")
        )));
    }
    if payload.name.primary().trim().is_empty() {
        return Err(Error::validation("name must have a non-empty primary entry"));
    }
    if payload.description.primary().trim().is_empty() {
        return Err(Error::validation(
            "description must have a non-empty primary entry",
        ));
    }

    let category = Category {
        key: payload.key,
        name: payload.name,
        description: payload.description,
        category_img: payload.category_img.unwrap_or_default(),
        created_at: Utc::now(),
    };
    stores.categories.insert(&category).await?;

    tracing::info!(category = %category.key, "category created");
    Ok(HttpResponse::Created().json(ApiResponse::success(category)))
}

/// Flat `{key: string}` translation map for one language
pub async fn translations(
    stores: web::Data<Stores>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let language = Language::from_code(Some(&path));
    let entries = stores.translations.all().await?;

    let map: BTreeMap<String, String> = entries
        .into_iter()
        .map(|entry| {
            let text = entry.text(language).to_string();
            (entry.key, text)
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(map)))
}

fn parse_coordinate(raw: Option<&str>, field: &str) -> Result<f64> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(format!("{field} is required")))?
        .parse::<f64>()
        .map_err(|_| Error::validation(format!("{field} must be a number")))?;
    if !value.is_finite() {
        return Err(Error::validation(format!("{field} must be a number")));
    }
    Ok(value)
}

/// Strict ISO dates: a present-but-garbled value is a caller error, not a
/// silently dropped filter.
fn parse_date_opt(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Error::validation(format!("{field} must be an ISO date (YYYY-MM-DD)"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_filters_are_strict_when_present() {
        assert_eq!(
            parse_date_opt(Some("2026-08-20"), "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 20)
        );
        assert_eq!(parse_date_opt(None, "start_date").unwrap(), None);
        assert_eq!(parse_date_opt(Some("  "), "start_date").unwrap(), None);
        assert!(parse_date_opt(Some("yesterday"), "start_date").is_err());
        assert!(parse_date_opt(Some("20-08-2026"), "start_date").is_err());
    }

    #[test]
    fn coordinates_are_required_and_numeric() {
        assert_eq!(parse_coordinate(Some("73.85"), "longitude").unwrap(), 73.85);
        assert!(parse_coordinate(None, "longitude").is_err());
        assert!(parse_coordinate(Some(""), "longitude").is_err());
        assert!(parse_coordinate(Some("east"), "longitude").is_err());
        assert!(parse_coordinate(Some("NaN"), "longitude").is_err());
    }
}
