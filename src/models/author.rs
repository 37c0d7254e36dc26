//! Author model, its form and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;
use super::forms::{clean_optional_date, FormErrors, REQUIRED};

/// Author row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First", the way the catalog lists authors
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn to_short(&self) -> AuthorShort {
        AuthorShort {
            id: self.id,
            name: self.display_name(),
        }
    }
}

/// Author reference embedded in book payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorShort {
    pub id: i32,
    pub name: String,
}

/// Author with the books credited to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Cleaned author fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Author create/update form, as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub last_name: String,
    /// YYYY-MM-DD, MM/DD/YYYY or MM/DD/YY
    pub date_of_birth: Option<String>,
    /// YYYY-MM-DD, MM/DD/YYYY or MM/DD/YY
    pub date_of_death: Option<String>,
}

impl AuthorForm {
    /// Validate the submission and produce the fields to save
    pub fn clean(&self) -> Result<AuthorFields, FormErrors> {
        let trimmed = AuthorForm {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self.clone()
        };

        let mut errors = match trimmed.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        for (field, value) in [
            ("first_name", &trimmed.first_name),
            ("last_name", &trimmed.last_name),
        ] {
            if value.is_empty() {
                errors.add(field, REQUIRED);
            }
        }

        let date_of_birth =
            clean_optional_date(&mut errors, "date_of_birth", trimmed.date_of_birth.as_deref());
        let date_of_death =
            clean_optional_date(&mut errors, "date_of_death", trimmed.date_of_death.as_deref());

        errors.into_result(AuthorFields {
            first_name: trimmed.first_name,
            last_name: trimmed.last_name,
            date_of_birth,
            date_of_death,
        })
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            date_of_death: author.date_of_death.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forms::INVALID_DATE;

    fn form(first: &str, last: &str) -> AuthorForm {
        AuthorForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_without_dates() {
        let fields = form("Jane", " Doe ").clean().unwrap();
        assert_eq!(fields.first_name, "Jane");
        assert_eq!(fields.last_name, "Doe");
        assert_eq!(fields.date_of_birth, None);
        assert_eq!(fields.date_of_death, None);
    }

    #[test]
    fn test_clean_requires_names() {
        let errors = form("", "   ").clean().unwrap_err();
        assert_eq!(errors.get("first_name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("last_name"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_clean_rejects_long_names() {
        let errors = form(&"x".repeat(101), "Doe").clean().unwrap_err();
        assert!(errors.has("first_name"));
        assert!(!errors.has("last_name"));
    }

    #[test]
    fn test_clean_parses_dates() {
        let mut submitted = form("Jane", "Doe");
        submitted.date_of_birth = Some("1950-01-02".to_string());
        submitted.date_of_death = Some("11/06/2020".to_string());
        let fields = submitted.clean().unwrap();
        assert_eq!(fields.date_of_birth, NaiveDate::from_ymd_opt(1950, 1, 2));
        assert_eq!(fields.date_of_death, NaiveDate::from_ymd_opt(2020, 11, 6));
    }

    #[test]
    fn test_clean_rejects_bad_date() {
        let mut submitted = form("Jane", "Doe");
        submitted.date_of_death = Some("yesterday".to_string());
        let errors = submitted.clean().unwrap_err();
        assert_eq!(errors.get("date_of_death"), Some(&[INVALID_DATE.to_string()][..]));
    }

    #[test]
    fn test_display_name() {
        let author = Author {
            id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.display_name(), "Doe, Jane");
        assert_eq!(AuthorForm::from(&author).last_name, "Doe");
    }
}
