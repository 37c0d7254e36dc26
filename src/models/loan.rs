//! Loan views and the renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::book_instance::LoanStatus;
use super::forms::{clean_required_date, FormErrors};

/// A copy currently out on loan, with enough context to list it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanedCopy {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Borrower username
    pub borrower: Option<String>,
    pub is_overdue: bool,
}

/// Librarian form proposing a new due date for a copy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Date between now and 4 weeks (default 3)
    #[serde(default)]
    pub renewal_date: String,
}

impl RenewBookForm {
    /// Form offered on first display: today plus the default renewal period
    pub fn proposed(today: NaiveDate, renewal_days: i64) -> Self {
        Self {
            renewal_date: (today + Duration::days(renewal_days))
                .format("%Y-%m-%d")
                .to_string(),
        }
    }

    /// Parse and range-check the submitted date
    pub fn clean(&self, today: NaiveDate, max_weeks: i64) -> Result<NaiveDate, FormErrors> {
        let mut errors = FormErrors::default();
        let Some(date) = clean_required_date(&mut errors, "renewal_date", &self.renewal_date) else {
            return Err(errors);
        };

        if date < today {
            errors.add("renewal_date", "Invalid date - renewal in past");
        }
        if date > today + Duration::weeks(max_weeks) {
            errors.add(
                "renewal_date",
                format!("Invalid date - renewal more than {} weeks ahead", max_weeks),
            );
        }

        errors.into_result(date)
    }
}
