//! Data models for the LocalLibrary catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod forms;
pub mod genre;
pub mod loan;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm};
pub use book::{Book, BookDetail, BookForm, BookSummary};
pub use book_instance::{BookInstance, LoanStatus};
pub use forms::FormErrors;
pub use genre::{Genre, Language};
pub use loan::{LoanedCopy, RenewBookForm};
pub use pagination::{PageInfo, PageQuery};
pub use user::{Permission, User, UserClaims};
