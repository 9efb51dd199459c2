// HTTP layer: actix-web server, routes, handlers and middleware for the
// mandi marketplace API.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
