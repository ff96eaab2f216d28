pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use repositories::user_repository::SqliteUserRepository;
use services::{auth_service::AuthService, user_service::UserService};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wire repositories and services over a connection pool.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let auth_service = Arc::new(AuthService::new(user_repository));

        AppState {
            user_service,
            auth_service,
            pool,
        }
    }
}
