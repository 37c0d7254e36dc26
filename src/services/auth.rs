//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by username and return a JWT token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let permissions = self.repository.users.get_permissions(user.id).await?;

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            permissions,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("Auth: user {} logged in", user.username);
        Ok(token)
    }

    /// Create the configured superuser unless an account with that name exists.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_superuser(&self) -> AppResult<bool> {
        let (username, password) = match (
            &self.config.superuser_username,
            &self.config.superuser_password,
        ) {
            (Some(username), Some(password)) => (username, password),
            (None, None) => return Ok(false),
            _ => {
                tracing::warn!("Auth: superuser needs both a username and a password");
                return Ok(false);
            }
        };

        if self.repository.users.get_by_username(username).await?.is_some() {
            tracing::debug!("Auth: superuser {} already exists", username);
            return Ok(false);
        }

        let password_hash = hash_password(password)?;
        self.repository.users.create(username, &password_hash, true).await?;
        tracing::info!("Auth: created superuser {}", username);
        Ok(true)
    }

    /// Decode a bearer token into claims
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Permission;
    use crate::test_support::MockRepositories;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..Default::default()
        }
    }

    fn user(password: &str, is_active: bool) -> User {
        User {
            id: 3,
            username: "librarian".to_string(),
            password: hash_password(password).unwrap(),
            first_name: "Lib".to_string(),
            last_name: "Rarian".to_string(),
            email: "librarian@example.com".to_string(),
            is_active,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn test_login_embeds_permissions() {
        let mut mocks = MockRepositories::default();
        let stored = user("s3cret", true);
        mocks
            .users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));
        mocks
            .users
            .expect_get_permissions()
            .returning(|_| Ok(vec!["catalog.can_mark_returned".to_string()]));

        let service = AuthService::new(mocks.into_repository(), config());
        let token = service.login("librarian", "s3cret").await.unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "librarian");
        assert_eq!(claims.user_id, 3);
        assert!(claims.has_perm(Permission::CanMarkReturned));
        assert!(!claims.has_perm(Permission::AddBook));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut mocks = MockRepositories::default();
        let stored = user("s3cret", true);
        mocks
            .users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));
        mocks.users.expect_get_permissions().never();

        let service = AuthService::new(mocks.into_repository(), config());
        let result = service.login("librarian", "guess").await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_login_inactive_or_unknown_user() {
        let mut mocks = MockRepositories::default();
        let stored = user("s3cret", false);
        mocks
            .users
            .expect_get_by_username()
            .returning(move |name| {
                if name == "librarian" {
                    Ok(Some(stored.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = AuthService::new(mocks.into_repository(), config());
        assert!(matches!(
            service.login("librarian", "s3cret").await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            service.login("nobody", "s3cret").await,
            Err(AppError::Authentication(_))
        ));
    }

    fn superuser_config() -> AuthConfig {
        AuthConfig {
            superuser_username: Some("admin".to_string()),
            superuser_password: Some("letmein".to_string()),
            ..config()
        }
    }

    #[tokio::test]
    async fn test_ensure_superuser_creates_missing_account() {
        let mut mocks = MockRepositories::default();
        mocks
            .users
            .expect_get_by_username()
            .returning(|_| Ok(None));
        mocks
            .users
            .expect_create()
            .withf(|username, password_hash, is_superuser| {
                let parsed = PasswordHash::new(password_hash).unwrap();
                username == "admin"
                    && *is_superuser
                    && Argon2::default()
                        .verify_password(b"letmein", &parsed)
                        .is_ok()
            })
            .times(1)
            .returning(|username, password_hash, is_superuser| {
                Ok(User {
                    id: 1,
                    username: username.to_string(),
                    password: password_hash.to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    email: String::new(),
                    is_active: true,
                    is_superuser,
                })
            });

        let service = AuthService::new(mocks.into_repository(), superuser_config());
        assert!(service.ensure_superuser().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_superuser_keeps_existing_account() {
        let mut mocks = MockRepositories::default();
        let stored = user("s3cret", true);
        mocks
            .users
            .expect_get_by_username()
            .returning(move |_| Ok(Some(stored.clone())));
        mocks.users.expect_create().never();

        let service = AuthService::new(mocks.into_repository(), superuser_config());
        assert!(!service.ensure_superuser().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_superuser_needs_both_settings() {
        let mut mocks = MockRepositories::default();
        mocks.users.expect_get_by_username().never();
        mocks.users.expect_create().never();
        let repository = mocks.into_repository();

        let unset = AuthService::new(repository.clone(), config());
        assert!(!unset.ensure_superuser().await.unwrap());

        let half = AuthService::new(
            repository,
            AuthConfig {
                superuser_username: Some("admin".to_string()),
                ..config()
            },
        );
        assert!(!half.ensure_superuser().await.unwrap());
    }

    #[test]
    fn test_verify_token_rejects_garbage() {
        let service = AuthService::new(MockRepositories::default().into_repository(), config());
        assert!(matches!(
            service.verify_token("not.a.token"),
            Err(AppError::Authentication(_))
        ));
    }
}
