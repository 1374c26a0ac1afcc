pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// The link API routes, without transport middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/links", post(handlers::links::add_link))
        .route("/links", get(handlers::links::list_links))
        .route("/links/lookup", get(handlers::links::get_link))
        .route("/links/preview", get(handlers::links::preview_link))
        .with_state(state)
}
