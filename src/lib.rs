//! Bilingual agricultural marketplace backend: localized product catalogs,
//! market directory, per-market price history and the location-aware
//! catalog pipeline that joins them.

pub mod api;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod store;
pub mod telemetry;

pub mod util {
    pub mod env;
}

pub use api::ApiServer;
pub use error::{Error, Result};
