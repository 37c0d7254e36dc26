//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod redis;
pub mod session;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use session::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(repository: Repository, config: &AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), config.catalog.clone()),
            loans: loans::LoansService::new(repository, config.catalog.clone()),
            sessions,
        }
    }
}
