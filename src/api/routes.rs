// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check (no auth required)
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        .service(
            web::scope("/api")
                // Catalog
                .route("/products", web::get().to(handlers::list_catalog))
                .route("/products", web::post().to(handlers::create_product))
                // Markets; the literal /nearby segment must register before
                // the {id} matcher
                .route("/markets", web::get().to(handlers::list_markets))
                .route("/markets", web::post().to(handlers::create_market))
                .route("/markets/nearby", web::get().to(handlers::nearby_markets))
                .route("/markets/{id}", web::get().to(handlers::get_market))
                .route("/markets/{id}", web::put().to(handlers::update_market))
                .route("/markets/{id}", web::delete().to(handlers::delete_market))
                // Price history
                .route("/prices", web::get().to(handlers::list_prices))
                .route("/prices", web::post().to(handlers::create_price))
                .route(
                    "/prices/market/{market}/latest",
                    web::get().to(handlers::latest_market_prices),
                )
                // Categories
                .route("/categories", web::get().to(handlers::list_categories))
                .route("/categories", web::post().to(handlers::create_category))
                // UI translations
                .route(
                    "/translations/{lang}",
                    web::get().to(handlers::translations),
                ),
        );
}
