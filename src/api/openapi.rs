//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "0.1.0",
        description = "Library catalog and loan tracking"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Catalog
        catalog::index,
        catalog::book_list,
        catalog::book_detail,
        catalog::author_list,
        catalog::author_detail,
        // Loans
        loans::my_borrowed,
        loans::all_borrowed,
        loans::renew_book_form,
        loans::renew_book,
        // Authors
        authors::author_create_form,
        authors::author_create,
        authors::author_update_form,
        authors::author_update,
        authors::author_delete_form,
        authors::author_delete,
        // Books
        books::book_create_form,
        books::book_create,
        books::book_update_form,
        books::book_update,
        books::book_delete_form,
        books::book_delete,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Catalog
            catalog::IndexContext,
            catalog::BookListContext,
            catalog::AuthorListContext,
            crate::services::catalog::CatalogSummary,
            crate::models::pagination::PageInfo,
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookShort,
            crate::models::book::BookDetail,
            crate::models::book::BookForm,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookCopy,
            crate::models::book_instance::LoanStatus,
            crate::models::genre::Genre,
            crate::models::genre::Language,
            // Loans
            loans::LoanListContext,
            loans::RenewContext,
            crate::models::loan::LoanedCopy,
            crate::models::loan::RenewBookForm,
            // Editing
            authors::AuthorFormContext,
            authors::AuthorDeleteContext,
            books::BookFormContext,
            books::BookDeleteContext,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog home, listings and details"),
        (name = "loans", description = "Loaned copies and renewals"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
