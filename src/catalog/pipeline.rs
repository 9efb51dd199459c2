use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::pagination::{self, PageParams};
use crate::catalog::price_join::attach_latest_prices;
use crate::catalog::resolver::resolve_market;
use crate::domain::{Language, Market, Unit};
use crate::error::Result;
use crate::store::Stores;

/// A parsed catalog request. Pagination and language are already normalized
/// by the time this struct exists; the remaining fields pass through as the
/// client sent them.
#[derive(Debug, Clone, Default)]
pub struct CatalogRequest {
    pub category: Option<String>,
    pub market: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub language: Language,
    pub pagination: PageParams,
}

/// One product of the listing page, joined with its latest quote in the
/// selected market. Products without a quote keep the default unit (`kg`)
/// and null price/stock/observation fields.
#[derive(Debug, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image: String,
    pub price: Option<f64>,
    pub stock: Option<f64>,
    pub unit: Unit,
    #[serde(rename = "observedAt")]
    pub observed_at: Option<NaiveDate>,
    pub market: Option<String>,
}

/// Localized projection of a market for the response envelope.
#[derive(Debug, Serialize)]
pub struct MarketSummary {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogFilters {
    #[serde(rename = "appliedCategory")]
    pub applied_category: Option<String>,
    #[serde(rename = "availableCategories")]
    pub available_categories: Vec<CategoryOption>,
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "totalItems")]
    pub total_items: i64,
    pub items: Vec<CatalogItem>,
    #[serde(rename = "selectedMarket")]
    pub selected_market: Option<MarketSummary>,
    #[serde(rename = "availableMarkets")]
    pub available_markets: Vec<MarketSummary>,
    pub filters: CatalogFilters,
}

fn market_summary(market: &Market, language: Language) -> MarketSummary {
    MarketSummary {
        id: market.code.clone(),
        name: market.name.localize(language).to_string(),
        city: market.city.localize(language).to_string(),
        state: market.state.localize(language).to_string(),
    }
}

/// Runs one catalog listing end to end: resolve the market, fetch the
/// product page, join the latest prices and assemble the localized
/// response. All-or-nothing; the first storage failure aborts the request.
pub async fn list_products(stores: &Stores, request: CatalogRequest) -> Result<CatalogPage> {
    let page = request.pagination;
    let language = request.language;
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // Market resolution, the product page, its total and the category list
    // are mutually independent; only the price join has to wait.
    let (resolved, products, total_items, categories) = tokio::try_join!(
        resolve_market(
            stores.markets.as_ref(),
            request.market.as_deref(),
            request.city.as_deref(),
            request.state.as_deref(),
        ),
        stores.products.page_by_category(category, page.limit, page.offset()),
        stores.products.count_by_category(category),
        stores.categories.all(),
    )?;

    let product_ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
    let quotes =
        attach_latest_prices(stores.prices.as_ref(), &product_ids, resolved.selected.as_ref())
            .await?;

    let market_code = resolved.selected.as_ref().map(|m| m.code.clone());
    let items = products
        .into_iter()
        .map(|product| {
            let name = product.name.localize(language).to_string();
            let quote = quotes.get(&product.id);
            CatalogItem {
                id: product.id,
                name,
                category: product.category,
                image: product.image,
                price: quote.map(|q| q.price),
                stock: quote.map(|q| q.stock),
                unit: quote.map(|q| q.unit).unwrap_or_default(),
                observed_at: quote.map(|q| q.observed_at),
                market: market_code.clone(),
            }
        })
        .collect();

    Ok(CatalogPage {
        page: page.page,
        total_pages: pagination::total_pages(total_items, page.limit),
        total_items,
        items,
        selected_market: resolved.selected.as_ref().map(|m| market_summary(m, language)),
        available_markets: resolved
            .available
            .iter()
            .map(|m| market_summary(m, language))
            .collect(),
        filters: CatalogFilters {
            applied_category: category.map(str::to_string),
            available_categories: categories
                .iter()
                .map(|c| CategoryOption {
                    id: c.key.clone(),
                    name: c.name.localize(language).to_string(),
                })
                .collect(),
        },
    })
}
