//! User model, permissions and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Catalog permissions, identified by their codename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
    /// Librarian-only loan management
    CanMarkReturned,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::AddAuthor,
        Permission::ChangeAuthor,
        Permission::DeleteAuthor,
        Permission::AddBook,
        Permission::ChangeBook,
        Permission::DeleteBook,
        Permission::CanMarkReturned,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Permission::AddAuthor => "catalog.add_author",
            Permission::ChangeAuthor => "catalog.change_author",
            Permission::DeleteAuthor => "catalog.delete_author",
            Permission::AddBook => "catalog.add_book",
            Permission::ChangeBook => "catalog.change_book",
            Permission::DeleteBook => "catalog.delete_book",
            Permission::CanMarkReturned => "catalog.can_mark_returned",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.codename())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.codename() == s)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    /// Permission codenames held by the user
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Superusers hold every permission
    pub fn has_perm(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == permission.codename())
    }

    pub fn require_perm(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_perm(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Permission {} required",
                permission.codename()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &[Permission], is_superuser: bool) -> UserClaims {
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 1,
            is_superuser,
            permissions: permissions.iter().map(|p| p.codename().to_string()).collect(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_has_perm() {
        let user = claims(&[Permission::CanMarkReturned], false);
        assert!(user.has_perm(Permission::CanMarkReturned));
        assert!(!user.has_perm(Permission::DeleteBook));
        assert!(matches!(
            user.require_perm(Permission::DeleteBook),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_superuser_has_everything() {
        let admin = claims(&[], true);
        for permission in Permission::ALL {
            assert!(admin.has_perm(permission));
        }
    }

    #[test]
    fn test_codename_parsing() {
        assert_eq!(
            "catalog.can_mark_returned".parse::<Permission>(),
            Ok(Permission::CanMarkReturned)
        );
        assert!("catalog.fly".parse::<Permission>().is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let user = claims(&[Permission::AddAuthor], false);
        let token = user.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "librarian");
        assert!(decoded.has_perm(Permission::AddAuthor));
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}
