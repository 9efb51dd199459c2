//! Core domain types: bilingual text, products, markets, price history,
//! the category vocabulary and UI translations.

pub mod category;
pub mod language;
pub mod market;
pub mod price;
pub mod product;
pub mod text;
pub mod translation;

pub use category::{is_valid_category_key, Category, NewCategory, CATEGORY_KEYS};
pub use language::Language;
pub use market::{GeoPoint, Market, MarketSearch, MarketUpdate, NewMarket};
pub use price::{NewPriceRecord, PriceQuery, PriceRecord, Unit};
pub use product::{NewProduct, Product};
pub use text::{localize, LocalizedText};
pub use translation::TranslationEntry;
