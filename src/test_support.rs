//! Shared fixtures for unit and router tests

use std::sync::Arc;

use crate::{
    config::AppConfig,
    models::{author::Author, book::Book, user::{Permission, UserClaims}},
    repository::{
        authors::MockAuthorsRepository, book_instances::MockBookInstancesRepository,
        books::MockBooksRepository, genres::MockGenresRepository, users::MockUsersRepository,
        Repository,
    },
    services::{session::MockSessionStore, Services},
    AppState,
};

pub const JWT_SECRET: &str = "test-secret";

/// One mock per repository trait, to be set up before building a `Repository`
#[derive(Default)]
pub struct MockRepositories {
    pub authors: MockAuthorsRepository,
    pub books: MockBooksRepository,
    pub book_instances: MockBookInstancesRepository,
    pub genres: MockGenresRepository,
    pub users: MockUsersRepository,
}

impl MockRepositories {
    pub fn into_repository(self) -> Repository {
        Repository {
            authors: Arc::new(self.authors),
            books: Arc::new(self.books),
            book_instances: Arc::new(self.book_instances),
            genres: Arc::new(self.genres),
            users: Arc::new(self.users),
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config
}

/// Application state over mocked storage
pub fn test_state(mocks: MockRepositories, sessions: MockSessionStore) -> AppState {
    let config = test_config();
    let services = Services::new(mocks.into_repository(), &config, Arc::new(sessions));
    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

/// Bearer header value for a user holding `permissions`
pub fn bearer(user_id: i32, permissions: &[Permission]) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = UserClaims {
        sub: format!("user{}", user_id),
        user_id,
        is_superuser: false,
        permissions: permissions.iter().map(|p| p.codename().to_string()).collect(),
        exp: now + 3600,
        iat: now,
    };
    format!("Bearer {}", claims.create_token(JWT_SECRET).unwrap())
}

pub fn author(id: i32, first_name: &str, last_name: &str) -> Author {
    Author {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        date_of_birth: None,
        date_of_death: None,
    }
}

pub fn book(id: i32, author_id: Option<i32>) -> Book {
    Book {
        id,
        title: format!("Book {}", id),
        summary: "A summary.".to_string(),
        isbn: format!("97800000000{:02}", id % 100),
        author_id,
        language_id: Some(1),
    }
}

/// Row inserts for repository tests running against the migrated schema
pub mod db {
    use chrono::NaiveDate;
    use sqlx::PgPool;
    use uuid::Uuid;

    pub async fn insert_user(pool: &PgPool, username: &str) -> i32 {
        sqlx::query_scalar("INSERT INTO users (username, password) VALUES ($1, 'x') RETURNING id")
            .bind(username)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    pub async fn insert_author(pool: &PgPool, first_name: &str, last_name: &str) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    pub async fn insert_language(pool: &PgPool, name: &str) -> i32 {
        sqlx::query_scalar("INSERT INTO languages (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    pub async fn insert_book(pool: &PgPool, title: &str, isbn: &str, author_id: Option<i32>) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO books (title, summary, isbn, author_id) VALUES ($1, 'A summary.', $2, $3) RETURNING id",
        )
        .bind(title)
        .bind(isbn)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    /// Copy with a one-letter status code
    pub async fn insert_copy(
        pool: &PgPool,
        book_id: i32,
        status: &str,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, 'Penguin, 1999', $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(due_back)
        .bind(status)
        .bind(borrower_id)
        .execute(pool)
        .await
        .unwrap();
        id
    }
}
