//! Book create/update/delete endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookForm},
        forms::FormErrors,
    },
    AppState,
};

use super::{form_rejected, perm, RequirePerm};

pub const BOOK_LIST_URL: &str = "/catalog/books";

fn book_url(id: i32) -> String {
    format!("/catalog/book/{}", id)
}

fn book_delete_url(id: i32) -> String {
    format!("/catalog/book/{}/delete", id)
}

#[derive(Serialize, ToSchema)]
pub struct BookFormContext {
    pub form: BookForm,
    /// The book being edited (update only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Book>,
    #[serde(skip_serializing_if = "FormErrors::is_empty")]
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

#[derive(Serialize, ToSchema)]
pub struct BookDeleteContext {
    pub object: Book,
}

/// Empty book form
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Empty form", body = BookFormContext),
        (status = 403, description = "Missing catalog.add_book")
    )
)]
pub async fn book_create_form(_: RequirePerm<perm::AddBook>) -> AppResult<Json<BookFormContext>> {
    Ok(Json(BookFormContext {
        form: BookForm::default(),
        object: None,
        errors: FormErrors::default(),
    }))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 303, description = "Created, redirected to the book"),
        (status = 403, description = "Missing catalog.add_book"),
        (status = 422, description = "Invalid form", body = BookFormContext)
    )
)]
pub async fn book_create(
    _: RequirePerm<perm::AddBook>,
    State(state): State<AppState>,
    Json(form): Json<BookForm>,
) -> AppResult<Response> {
    match state.services.catalog.create_book(&form).await {
        Ok(book) => Ok(Redirect::to(&book_url(book.id)).into_response()),
        Err(AppError::InvalidForm(errors)) => Ok(form_rejected(BookFormContext {
            form,
            object: None,
            errors,
        })),
        Err(e) => Err(e),
    }
}

/// Book form pre-populated from the stored row and its genres
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Pre-populated form", body = BookFormContext),
        (status = 403, description = "Missing catalog.change_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update_form(
    _: RequirePerm<perm::ChangeBook>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormContext>> {
    let (book, form) = state.services.catalog.book_form(id).await?;
    Ok(Json(BookFormContext {
        form,
        object: Some(book),
        errors: FormErrors::default(),
    }))
}

/// Update a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 303, description = "Updated, redirected to the book"),
        (status = 403, description = "Missing catalog.change_book"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Invalid form", body = BookFormContext)
    )
)]
pub async fn book_update(
    _: RequirePerm<perm::ChangeBook>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> AppResult<Response> {
    match state.services.catalog.update_book(id, &form).await {
        Ok(book) => Ok(Redirect::to(&book_url(book.id)).into_response()),
        Err(AppError::InvalidForm(errors)) => {
            let object = state.services.catalog.get_book_row(id).await?;
            Ok(form_rejected(BookFormContext {
                form,
                object: Some(object),
                errors,
            }))
        }
        Err(e) => Err(e),
    }
}

/// Delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to delete", body = BookDeleteContext),
        (status = 403, description = "Missing catalog.delete_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_delete_form(
    _: RequirePerm<perm::DeleteBook>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDeleteContext>> {
    let object = state.services.catalog.get_book_row(id).await?;
    Ok(Json(BookDeleteContext { object }))
}

/// Delete a book. Books that still have copies are kept.
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted (redirect to the list) or still referenced (redirect back to the confirmation)"),
        (status = 403, description = "Missing catalog.delete_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_delete(
    _: RequirePerm<perm::DeleteBook>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    match state.services.catalog.delete_book(id).await {
        Ok(()) => Ok(Redirect::to(BOOK_LIST_URL)),
        Err(AppError::Constraint(_)) => Ok(Redirect::to(&book_delete_url(id))),
        Err(e) => Err(e),
    }
}
