//! Loaned copies and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstance,
        forms::FormErrors,
        loan::{LoanedCopy, RenewBookForm},
        pagination::{PageInfo, PageQuery},
    },
    AppState,
};

use super::{form_rejected, perm, CurrentUser, RequirePerm};

/// Where a successful renewal sends the librarian
pub const BORROWED_URL: &str = "/catalog/borrowed";

#[derive(Serialize, ToSchema)]
pub struct LoanListContext {
    pub bookinstance_list: Vec<LoanedCopy>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
}

#[derive(Serialize, ToSchema)]
pub struct RenewContext {
    pub book_instance: BookInstance,
    pub form: RenewBookForm,
    #[serde(skip_serializing_if = "FormErrors::is_empty")]
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/catalog/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = LoanListContext),
        (status = 303, description = "Not logged in, redirected to the login page"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    user: CurrentUser,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanListContext>> {
    let claims = user.require_login(&state.config.auth.login_url, uri.path())?;

    let (bookinstance_list, page_obj) = state
        .services
        .loans
        .my_loans(
            claims.user_id,
            query.page.as_deref(),
            Local::now().date_naive(),
        )
        .await?;

    Ok(Json(LoanListContext {
        bookinstance_list,
        is_paginated: page_obj.is_paginated(),
        page_obj,
    }))
}

/// Every copy on loan, for librarians
#[utoipa::path(
    get,
    path = "/catalog/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All loans, soonest due first", body = LoanListContext),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn all_borrowed(
    _: RequirePerm<perm::CanMarkReturned>,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanListContext>> {
    let (bookinstance_list, page_obj) = state
        .services
        .loans
        .all_loans(query.page.as_deref(), Local::now().date_naive())
        .await?;

    Ok(Json(LoanListContext {
        bookinstance_list,
        is_paginated: page_obj.is_paginated(),
        page_obj,
    }))
}

/// Renewal form for a copy, proposing a date three weeks out
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewContext),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book_form(
    _: RequirePerm<perm::CanMarkReturned>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewContext>> {
    let book_instance = state.services.loans.get_instance(id).await?;
    let form = state.services.loans.proposed_renewal(Local::now().date_naive());

    Ok(Json(RenewContext {
        book_instance,
        form,
        errors: FormErrors::default(),
    }))
}

/// Set a new due date for a copy
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 303, description = "Renewed, redirected to the borrowed list"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Invalid renewal date", body = RenewContext)
    )
)]
pub async fn renew_book(
    _: RequirePerm<perm::CanMarkReturned>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<RenewBookForm>,
) -> AppResult<Response> {
    let book_instance = state.services.loans.get_instance(id).await?;
    let today = Local::now().date_naive();

    match state.services.loans.renew(&book_instance, &form, today).await {
        Ok(_) => Ok(Redirect::to(BORROWED_URL).into_response()),
        Err(AppError::InvalidForm(errors)) => Ok(form_rejected(RenewContext {
            book_instance,
            form,
            errors,
        })),
        Err(e) => Err(e),
    }
}
