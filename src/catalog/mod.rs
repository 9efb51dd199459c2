//! The location-aware catalog core: market resolution, latest-price joins
//! and the paginated listing pipeline that ties them together.

pub mod pagination;
pub mod pipeline;
pub mod price_join;
pub mod resolver;

pub use pagination::PageParams;
pub use pipeline::{list_products, CatalogPage, CatalogRequest};
pub use price_join::{attach_latest_prices, latest_by_product, PriceQuote};
pub use resolver::{resolve_market, ResolvedMarkets};
