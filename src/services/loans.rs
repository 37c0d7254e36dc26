//! Loan tracking and renewal service

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstance,
        loan::{LoanedCopy, RenewBookForm},
        pagination::{resolve_page, PageInfo},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: CatalogConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Copies on loan to one borrower, soonest due first
    pub async fn my_loans(
        &self,
        user_id: i32,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        self.on_loan(Some(user_id), page, today).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_loans(
        &self,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        self.on_loan(None, page, today).await
    }

    async fn on_loan(
        &self,
        borrower: Option<i32>,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        let count = self.repository.book_instances.count_on_loan(borrower).await?;
        let window = resolve_page(page, count, self.config.page_size)?;
        let loans = self
            .repository
            .book_instances
            .list_on_loan(borrower, today, window.limit, window.offset)
            .await?;
        Ok((loans, window.info))
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.book_instances.get_by_id(id).await
    }

    /// Form offered before the librarian picks a date
    pub fn proposed_renewal(&self, today: NaiveDate) -> RenewBookForm {
        RenewBookForm::proposed(today, self.config.renewal_days)
    }

    /// Validate the renewal date and store it as the copy's new due date.
    ///
    /// An invalid form fails with `AppError::InvalidForm` and changes nothing.
    pub async fn renew(
        &self,
        instance: &BookInstance,
        form: &RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<NaiveDate> {
        let due_back = form
            .clean(today, self.config.max_renewal_weeks)
            .map_err(AppError::InvalidForm)?;

        self.repository
            .book_instances
            .set_due_back(instance.id, due_back)
            .await?;

        tracing::info!("Loans: copy {} renewed until {}", instance.id, due_back);
        Ok(due_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book_instance::LoanStatus;
    use crate::test_support::MockRepositories;
    use mockall::predicate::eq;

    fn service(mocks: MockRepositories) -> LoansService {
        LoansService::new(mocks.into_repository(), CatalogConfig::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn instance() -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: 1,
            imprint: "Penguin, 1999".to_string(),
            due_back: NaiveDate::from_ymd_opt(2024, 6, 3),
            status: LoanStatus::OnLoan,
            borrower_id: Some(5),
        }
    }

    #[tokio::test]
    async fn test_my_loans_filters_by_borrower() {
        let mut mocks = MockRepositories::default();
        mocks
            .book_instances
            .expect_count_on_loan()
            .with(eq(Some(5)))
            .returning(|_| Ok(0));
        mocks
            .book_instances
            .expect_list_on_loan()
            .with(eq(Some(5)), eq(today()), eq(10), eq(0))
            .returning(|_, _, _, _| Ok(vec![]));

        let (loans, page) = service(mocks).my_loans(5, None, today()).await.unwrap();
        assert!(loans.is_empty());
        assert_eq!(page.number, 1);
    }

    #[tokio::test]
    async fn test_all_loans_without_borrower() {
        let mut mocks = MockRepositories::default();
        mocks
            .book_instances
            .expect_count_on_loan()
            .with(eq(None))
            .returning(|_| Ok(11));
        mocks
            .book_instances
            .expect_list_on_loan()
            .with(eq(None), eq(today()), eq(10), eq(10))
            .returning(|_, _, _, _| Ok(vec![]));

        let (_, page) = service(mocks).all_loans(Some("last"), today()).await.unwrap();
        assert_eq!(page.number, 2);
        assert!(page.has_previous);
    }

    #[test]
    fn test_proposed_renewal_is_three_weeks_out() {
        let form = service(MockRepositories::default()).proposed_renewal(today());
        assert_eq!(form.renewal_date, "2024-06-22");
    }

    #[tokio::test]
    async fn test_renew_valid_date_is_saved() {
        let copy = instance();
        let expected = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut mocks = MockRepositories::default();
        mocks
            .book_instances
            .expect_set_due_back()
            .with(eq(copy.id), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));

        let form = RenewBookForm {
            renewal_date: "06/15/2024".to_string(),
        };
        let due_back = service(mocks).renew(&copy, &form, today()).await.unwrap();
        assert_eq!(due_back, expected);
    }

    #[tokio::test]
    async fn test_renew_invalid_date_changes_nothing() {
        let mut mocks = MockRepositories::default();
        mocks.book_instances.expect_set_due_back().never();

        let form = RenewBookForm {
            renewal_date: "2024-07-30".to_string(),
        };
        match service(mocks).renew(&instance(), &form, today()).await {
            Err(AppError::InvalidForm(errors)) => assert_eq!(
                errors.get("renewal_date"),
                Some(&["Invalid date - renewal more than 4 weeks ahead".to_string()][..])
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
