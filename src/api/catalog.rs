//! Home page, listing and detail endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail},
        book::{BookDetail, BookSummary},
        pagination::{PageInfo, PageQuery},
    },
    services::catalog::CatalogSummary,
    AppState,
};

/// Extra context value carried by the listing views
pub const SOME_DATA: &str = "This is just some data";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IndexQuery {
    /// Count the books whose title contains this word (case-insensitive)
    pub book_contains: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct IndexContext {
    #[serde(flatten)]
    pub summary: CatalogSummary,
    /// Visits to this page in the current session, this one included
    pub num_visits: i64,
}

#[derive(Serialize, ToSchema)]
pub struct BookListContext {
    pub book_list: Vec<BookSummary>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
    pub some_data: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthorListContext {
    pub author_list: Vec<Author>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
    pub some_data: String,
}

/// Catalog home page: counts and session visit counter
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    params(IndexQuery),
    responses(
        (status = 200, description = "Catalog summary", body = IndexContext)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> AppResult<(CookieJar, Json<IndexContext>)> {
    let summary = state
        .services
        .catalog
        .summary(query.book_contains.as_deref())
        .await?;

    let session = &state.config.session;
    let session_id = jar
        .get(&session.cookie_name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .unwrap_or_else(Uuid::new_v4)
        .to_string();

    let num_visits = state.services.sessions.increment_visits(&session_id).await?;

    let cookie = Cookie::build((session.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(session.ttl_seconds as i64));

    Ok((jar.add(cookie), Json(IndexContext { summary, num_visits })))
}

/// List books, 10 per page
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = BookListContext),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn book_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookListContext>> {
    let (book_list, page_obj) = state.services.catalog.list_books(query.page.as_deref()).await?;

    Ok(Json(BookListContext {
        book_list,
        is_paginated: page_obj.is_paginated(),
        page_obj,
        some_data: SOME_DATA.to_string(),
    }))
}

/// Get book details with its copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state
        .services
        .catalog
        .get_book(id, Local::now().date_naive())
        .await?;
    Ok(Json(book))
}

/// List authors, 10 per page
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of authors", body = AuthorListContext),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn author_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AuthorListContext>> {
    let (author_list, page_obj) = state.services.catalog.list_authors(query.page.as_deref()).await?;

    Ok(Json(AuthorListContext {
        author_list,
        is_paginated: page_obj.is_paginated(),
        page_obj,
        some_data: SOME_DATA.to_string(),
    }))
}

/// Get author details with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}
