//! API handlers for LocalLibrary endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;


use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::user::{Permission, UserClaims},
    AppState,
};

/// Caller identity from the JWT bearer token; `None` for anonymous callers
pub struct CurrentUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;
        Ok(CurrentUser(Some(claims)))
    }
}

impl CurrentUser {
    /// Anonymous callers are sent to the login page, with `next` pointing back at `path`
    pub fn require_login(&self, login_url: &str, path: &str) -> AppResult<&UserClaims> {
        self.0
            .as_ref()
            .ok_or_else(|| AppError::LoginRequired(format!("{}?next={}", login_url, path)))
    }

    /// Forbidden unless the caller holds `permission`; anonymous callers never do
    pub fn require_perm(&self, permission: Permission) -> AppResult<&UserClaims> {
        match &self.0 {
            Some(claims) => {
                claims.require_perm(permission)?;
                Ok(claims)
            }
            None => Err(AppError::Authorization(format!(
                "Permission {} required",
                permission.codename()
            ))),
        }
    }
}

/// A permission checked by the `RequirePerm` extractor
pub trait PermissionGuard: Send + Sync + 'static {
    const PERMISSION: Permission;
}

/// Marker types naming each catalog permission
pub mod perm {
    use super::PermissionGuard;
    use crate::models::user::Permission;

    macro_rules! guards {
        ($($name:ident),* $(,)?) => {
            $(
                pub struct $name;

                impl PermissionGuard for $name {
                    const PERMISSION: Permission = Permission::$name;
                }
            )*
        };
    }

    guards!(
        AddAuthor,
        ChangeAuthor,
        DeleteAuthor,
        AddBook,
        ChangeBook,
        DeleteBook,
        CanMarkReturned,
    );
}

/// Caller holding `P::PERMISSION`.
///
/// Must come before `Path` and `Json` in a handler's arguments so that callers
/// without the permission get 403 whatever they sent.
pub struct RequirePerm<P: PermissionGuard> {
    pub claims: UserClaims,
    _permission: PhantomData<P>,
}

#[async_trait]
impl<P: PermissionGuard> FromRequestParts<AppState> for RequirePerm<P> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let claims = user.require_perm(P::PERMISSION)?.clone();
        Ok(RequirePerm {
            claims,
            _permission: PhantomData,
        })
    }
}

/// Re-render a rejected form: 422 with the full form context
pub(crate) fn form_rejected<T: Serialize>(context: T) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(context)).into_response()
}
