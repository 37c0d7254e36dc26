//! Book model, its form and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::AuthorShort;
use super::book_instance::BookCopy;
use super::forms::{FormErrors, REQUIRED};
use super::genre::{Genre, Language};

/// Book row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
}

/// Book row as shown on the book list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    /// Author display name ("Last, First")
    pub author: Option<String>,
}

/// Book reference shown on an author's page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub summary: String,
}

/// Book with its author, language, genres and copies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<AuthorShort>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookCopy>,
}

/// Cleaned book fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
    pub language_id: i32,
}

/// Book create/update form, as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[serde(default)]
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    /// Author id
    pub author: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Ensure this value has at most 1000 characters."))]
    pub summary: String,
    /// 13 character ISBN
    #[serde(default)]
    #[validate(length(max = 13, message = "Ensure this value has at most 13 characters."))]
    pub isbn: String,
    /// Genre ids
    #[serde(default)]
    pub genre: Vec<i32>,
    /// Language id
    pub language: Option<i32>,
}

impl BookForm {
    /// Structural validation; reference checks happen against the store
    pub fn clean(&self) -> Result<BookFields, FormErrors> {
        let trimmed = BookForm {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            ..self.clone()
        };

        let mut errors = match trimmed.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        for (field, value) in [
            ("title", &trimmed.title),
            ("summary", &trimmed.summary),
            ("isbn", &trimmed.isbn),
        ] {
            if value.is_empty() {
                errors.add(field, REQUIRED);
            }
        }
        if trimmed.author.is_none() {
            errors.add("author", REQUIRED);
        }
        if trimmed.language.is_none() {
            errors.add("language", REQUIRED);
        }

        let mut genre_ids = trimmed.genre.clone();
        genre_ids.sort_unstable();
        genre_ids.dedup();
        if genre_ids.is_empty() {
            errors.add("genre", REQUIRED);
        }

        match (trimmed.author, trimmed.language) {
            (Some(author_id), Some(language_id)) if errors.is_empty() => Ok(BookFields {
                title: trimmed.title,
                author_id,
                summary: trimmed.summary,
                isbn: trimmed.isbn,
                genre_ids,
                language_id,
            }),
            _ => Err(errors),
        }
    }
}

impl BookForm {
    /// Pre-populate the update form from a stored book
    pub fn from_book(book: &Book, genres: &[Genre]) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id,
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: genres.iter().map(|g| g.id).collect(),
            language: book.language_id,
        }
    }
}
