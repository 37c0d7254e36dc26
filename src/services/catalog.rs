//! Catalog service: home summary, listings, details and staff editing

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        book::{Book, BookDetail, BookFields, BookForm, BookSummary},
        book_instance::LoanStatus,
        forms::{FormErrors, INVALID_CHOICE},
        pagination::{resolve_page, PageInfo},
    },
    repository::Repository,
};

/// Row counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Echo of the `book_contains` parameter
    pub contains_word: String,
    pub num_books_containing_word: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Home page counts. An empty or missing word counts nothing.
    pub async fn summary(&self, book_contains: Option<&str>) -> AppResult<CatalogSummary> {
        let contains_word = book_contains.unwrap_or_default().to_string();
        let num_books_containing_word = if contains_word.is_empty() {
            0
        } else {
            self.repository.books.count_title_contains(&contains_word).await?
        };

        Ok(CatalogSummary {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_instances_available: self
                .repository
                .book_instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
            contains_word,
            num_books_containing_word,
        })
    }

    /// Cheap round-trip to the store, for readiness probes
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.genres.count().await?;
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: Option<&str>) -> AppResult<(Vec<BookSummary>, PageInfo)> {
        let count = self.repository.books.count().await?;
        let window = resolve_page(page, count, self.config.page_size)?;
        let books = self.repository.books.list(window.limit, window.offset).await?;
        Ok((books, window.info))
    }

    /// Book with author, language, genres and copies, overdue as of `today`
    pub async fn get_book(&self, id: i32, today: NaiveDate) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?.to_short()),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.genres.get_language(language_id).await?),
            None => None,
        };
        let genres = self.repository.books.genres_of(id).await?;
        let copies = self.repository.book_instances.list_for_book(id, today).await?;

        Ok(BookDetail {
            book,
            author,
            language,
            genres,
            copies,
        })
    }

    /// Stored book and the form pre-populated from it
    pub async fn book_form(&self, id: i32) -> AppResult<(Book, BookForm)> {
        let book = self.repository.books.get_by_id(id).await?;
        let genres = self.repository.books.genres_of(id).await?;
        let form = BookForm::from_book(&book, &genres);
        Ok((book, form))
    }

    pub async fn get_book_row(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        let fields = self.clean_book_form(form).await?;
        let book = self
            .repository
            .books
            .create(&fields)
            .await
            .map_err(duplicate_isbn_as_form_error)?;

        tracing::info!("Catalog: created book id={} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await?;
        let fields = self.clean_book_form(form).await?;
        let book = self
            .repository
            .books
            .update(id, &fields)
            .await
            .map_err(duplicate_isbn_as_form_error)?;

        tracing::info!("Catalog: updated book id={}", id);
        Ok(book)
    }

    /// Fails with `AppError::Constraint` while copies of the book exist
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        match self.repository.books.delete(id).await {
            Ok(()) => {
                tracing::info!("Catalog: deleted book id={}", id);
                Ok(())
            }
            Err(AppError::Constraint(msg)) => {
                tracing::warn!("Catalog: book id={} is still referenced: {}", id, msg);
                Err(AppError::Constraint(msg))
            }
            Err(e) => Err(e),
        }
    }

    /// Structural validation, then check every referenced row exists
    async fn clean_book_form(&self, form: &BookForm) -> AppResult<BookFields> {
        let fields = form.clean().map_err(AppError::InvalidForm)?;
        let mut errors = FormErrors::default();

        match self.repository.authors.get_by_id(fields.author_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => errors.add("author", INVALID_CHOICE),
            Err(e) => return Err(e),
        }
        match self.repository.genres.get_language(fields.language_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => errors.add("language", INVALID_CHOICE),
            Err(e) => return Err(e),
        }
        let genres = self.repository.genres.find_by_ids(&fields.genre_ids).await?;
        if genres.len() != fields.genre_ids.len() {
            errors.add("genre", INVALID_CHOICE);
        }

        errors.into_result(fields).map_err(AppError::InvalidForm)
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<(Vec<Author>, PageInfo)> {
        let count = self.repository.authors.count().await?;
        let window = resolve_page(page, count, self.config.page_size)?;
        let authors = self.repository.authors.list(window.limit, window.offset).await?;
        Ok((authors, window.info))
    }

    /// Author with the books credited to them
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub async fn get_author_row(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        let fields = form.clean().map_err(AppError::InvalidForm)?;
        let author = self.repository.authors.create(&fields).await?;

        tracing::info!("Catalog: created author id={} ({})", author.id, author.display_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await?;
        let fields = form.clean().map_err(AppError::InvalidForm)?;
        let author = self.repository.authors.update(id, &fields).await?;

        tracing::info!("Catalog: updated author id={}", id);
        Ok(author)
    }

    /// Fails with `AppError::Constraint` while books still reference the author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        match self.repository.authors.delete(id).await {
            Ok(()) => {
                tracing::info!("Catalog: deleted author id={}", id);
                Ok(())
            }
            Err(AppError::Constraint(msg)) => {
                tracing::warn!("Catalog: author id={} is still referenced: {}", id, msg);
                Err(AppError::Constraint(msg))
            }
            Err(e) => Err(e),
        }
    }
}

fn duplicate_isbn_as_form_error(error: AppError) -> AppError {
    match error {
        AppError::Conflict(_) => {
            let mut errors = FormErrors::default();
            errors.add("isbn", "Book with this ISBN already exists.");
            AppError::InvalidForm(errors)
        }
        other => other,
    }
}
