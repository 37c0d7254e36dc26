//! Author create/update/delete endpoints

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
        author::{Author, AuthorForm},
        forms::FormErrors,
    },
    AppState,
};

use super::{form_rejected, perm, RequirePerm};

pub const AUTHOR_LIST_URL: &str = "/catalog/authors";

fn author_url(id: i32) -> String {
    format!("/catalog/author/{}", id)
}

fn author_delete_url(id: i32) -> String {
    format!("/catalog/author/{}/delete", id)
}

#[derive(Serialize, ToSchema)]
pub struct AuthorFormContext {
    pub form: AuthorForm,
    /// The author being edited (update only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Author>,
    #[serde(skip_serializing_if = "FormErrors::is_empty")]
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

#[derive(Serialize, ToSchema)]
pub struct AuthorDeleteContext {
    pub object: Author,
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Empty form", body = AuthorFormContext),
        (status = 403, description = "Missing catalog.add_author")
    )
)]
pub async fn author_create_form(
    _: RequirePerm<perm::AddAuthor>,
) -> AppResult<Json<AuthorFormContext>> {
    Ok(Json(AuthorFormContext {
        form: AuthorForm::default(),
        object: None,
        errors: FormErrors::default(),
    }))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Created, redirected to the author"),
        (status = 403, description = "Missing catalog.add_author"),
        (status = 422, description = "Invalid form", body = AuthorFormContext)
    )
)]
pub async fn author_create(
    _: RequirePerm<perm::AddAuthor>,
    State(state): State<AppState>,
    Json(form): Json<AuthorForm>,
) -> AppResult<Response> {
    match state.services.catalog.create_author(&form).await {
        Ok(author) => Ok(Redirect::to(&author_url(author.id)).into_response()),
        Err(AppError::InvalidForm(errors)) => Ok(form_rejected(AuthorFormContext {
            form,
            object: None,
            errors,
        })),
        Err(e) => Err(e),
    }
}

/// Author form pre-populated from the stored row
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Pre-populated form", body = AuthorFormContext),
        (status = 403, description = "Missing catalog.change_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_update_form(
    _: RequirePerm<perm::ChangeAuthor>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorFormContext>> {
    let author = state.services.catalog.get_author_row(id).await?;
    Ok(Json(AuthorFormContext {
        form: AuthorForm::from(&author),
        object: Some(author),
        errors: FormErrors::default(),
    }))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Updated, redirected to the author"),
        (status = 403, description = "Missing catalog.change_author"),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Invalid form", body = AuthorFormContext)
    )
)]
pub async fn author_update(
    _: RequirePerm<perm::ChangeAuthor>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<AuthorForm>,
) -> AppResult<Response> {
    match state.services.catalog.update_author(id, &form).await {
        Ok(author) => Ok(Redirect::to(&author_url(author.id)).into_response()),
        Err(AppError::InvalidForm(errors)) => {
            let object = state.services.catalog.get_author_row(id).await?;
            Ok(form_rejected(AuthorFormContext {
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
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author to delete", body = AuthorDeleteContext),
        (status = 403, description = "Missing catalog.delete_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_delete_form(
    _: RequirePerm<perm::DeleteAuthor>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDeleteContext>> {
    let object = state.services.catalog.get_author_row(id).await?;
    Ok(Json(AuthorDeleteContext { object }))
}

/// Delete an author. Authors still credited on a book are kept.
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted (redirect to the list) or still referenced (redirect back to the confirmation)"),
        (status = 403, description = "Missing catalog.delete_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_delete(
    _: RequirePerm<perm::DeleteAuthor>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    match state.services.catalog.delete_author(id).await {
        Ok(()) => Ok(Redirect::to(AUTHOR_LIST_URL)),
        Err(AppError::Constraint(_)) => Ok(Redirect::to(&author_delete_url(id))),
        Err(e) => Err(e),
    }
}
