//! LocalLibrary catalog server
//!
//! A REST JSON API for a small library: books, authors, genres and physical
//! copies, staff editing forms, and loan tracking with renewals.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog: Router = Router::new()
        .route("/catalog", get(api::catalog::index))
        .route("/catalog/", get(api::catalog::index))
        // Listings and details
        .route("/catalog/books", get(api::catalog::book_list))
        .route("/catalog/book/:id", get(api::catalog::book_detail))
        .route("/catalog/authors", get(api::catalog::author_list))
        .route("/catalog/author/:id", get(api::catalog::author_detail))
        // Loans
        .route("/catalog/mybooks", get(api::loans::my_borrowed))
        .route("/catalog/borrowed", get(api::loans::all_borrowed))
        .route(
            "/catalog/book/:id/renew",
            get(api::loans::renew_book_form).post(api::loans::renew_book),
        )
        // Authors
        .route(
            "/catalog/author/create",
            get(api::authors::author_create_form).post(api::authors::author_create),
        )
        .route(
            "/catalog/author/:id/update",
            get(api::authors::author_update_form).post(api::authors::author_update),
        )
        .route(
            "/catalog/author/:id/delete",
            get(api::authors::author_delete_form).post(api::authors::author_delete),
        )
        // Books
        .route(
            "/catalog/book/create",
            get(api::books::book_create_form).post(api::books::book_create),
        )
        .route(
            "/catalog/book/:id/update",
            get(api::books::book_update_form).post(api::books::book_update),
        )
        .route(
            "/catalog/book/:id/delete",
            get(api::books::book_delete_form).post(api::books::book_delete),
        )
        // Accounts and probes
        .route("/accounts/login", axum::routing::post(api::auth::login))
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .with_state(state);

    Router::new()
        .route("/", get(|| async { axum::response::Redirect::permanent("/catalog/") }))
        .merge(catalog)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
