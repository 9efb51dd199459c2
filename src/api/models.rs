// API request/response models (DTOs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::pagination::{self, PageParams};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn paginated(data: T, params: &PageParams, total: i64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: Some(Pagination::new(params, total)),
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            pagination: None,
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Pagination block for list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(params: &PageParams, total: i64) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages: pagination::total_pages(total, params.limit),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

/// Catalog listing query. Everything arrives as strings; pagination and
/// language are forgiving, the market identifier is not.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub market: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub lang: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Market directory query.
#[derive(Debug, Deserialize)]
pub struct MarketListQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Nearby-market query. Coordinates are parsed by hand so a malformed value
/// produces the standard error envelope instead of actix's default.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    #[serde(alias = "maxDistance")]
    pub max_distance: Option<String>,
    pub limit: Option<String>,
}

/// Price history query.
#[derive(Debug, Deserialize)]
pub struct PriceListQuery {
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
    pub market: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_meta_but_no_error() {
        let response = ApiResponse::success(serde_json::json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());
        assert!(value["meta"]["request_id"].is_string());
    }

    #[test]
    fn paginated_envelope_computes_total_pages() {
        let params = PageParams::normalize(2, 20);
        let response = ApiResponse::paginated(vec![1, 2, 3], &params, 45);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["pagination"]["page"], 2);
        assert_eq!(value["pagination"]["total"], 45);
        assert_eq!(value["pagination"]["totalPages"], 3);
    }
}
