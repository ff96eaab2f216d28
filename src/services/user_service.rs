use crate::models::user::{
    AccountStatus, NewUser, SubscriptionStatus, SubscriptionUpdate, User, MIN_PASSWORD_LEN,
    TRIAL_PERIOD_DAYS,
};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("A valid email address is required")]
    InvalidEmail,
    #[error("First name is required")]
    MissingFirstName,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("Status must be either 'quilter' or 'designer'")]
    InvalidStatus,
    #[error("Email already registered")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub display_name: Option<String>,
    /// Raw status string from the caller; defaults to "quilter" when absent.
    pub status: Option<String>,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new account: validate, hash, open the 14-day trial, and
    /// insert. Duplicate emails fail on the store's uniqueness constraint,
    /// so a concurrent double-submit can never overwrite an existing row.
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let email = Self::normalize_email(&request.email);
        self.validate_email(&email)?;

        let first_name = request.first_name.trim();
        if first_name.is_empty() {
            return Err(UserServiceError::MissingFirstName);
        }

        self.validate_password(&request.password)?;

        let status = match request.status.as_deref() {
            None | Some("") => AccountStatus::Quilter,
            Some(raw) => AccountStatus::parse(raw).ok_or(UserServiceError::InvalidStatus)?,
        };

        let password_hash = self.hash_password(&request.password)?;

        let new_user = NewUser {
            email,
            password_hash,
            first_name: first_name.to_string(),
            display_name: request.display_name.filter(|name| !name.trim().is_empty()),
            status,
            subscription_status: SubscriptionStatus::Trial,
            trial_ends_at: Some(Utc::now() + Duration::days(TRIAL_PERIOD_DAYS)),
        };

        match self.repository.create_user(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, email = %user.email, "user registered");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .repository
            .find_by_email(&Self::normalize_email(email))
            .await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    /// Apply a billing-driven subscription change. Called by the operator
    /// CLI today; the payment-webhook collaborator would use the same seam.
    pub async fn set_subscription(
        &self,
        user_id: i64,
        update: SubscriptionUpdate,
    ) -> Result<(), UserServiceError> {
        match self.repository.update_subscription(user_id, update).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        if email.is_empty() || email.len() > 255 || !EMAIL_RE.is_match(email) {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), UserServiceError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(UserServiceError::WeakPassword);
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;

    fn stored_user(id: i64, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Alice".to_string(),
            display_name: None,
            status: AccountStatus::Quilter,
            subscription_status: SubscriptionStatus::Trial,
            subscription_plan: None,
            trial_ends_at: Some(Utc::now() + Duration::days(TRIAL_PERIOD_DAYS)),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: None,
        }
    }

    fn create_request(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Alice".to_string(),
            display_name: None,
            status: Some("quilter".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_user_success_opens_trial() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_create_user()
            .withf(|new_user| {
                let ends = new_user.trial_ends_at.expect("trial end set");
                let expected = Utc::now() + Duration::days(TRIAL_PERIOD_DAYS);
                new_user.email == "alice@example.com"
                    && new_user.subscription_status == SubscriptionStatus::Trial
                    && (ends - expected).num_seconds().abs() < 5
                    && new_user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|_| Box::pin(async move { Ok(stored_user(1, "alice@example.com")) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service
            .create_user(create_request("Alice@Example.com ", "password123"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_user_weak_password() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let result = service.create_user(create_request("a@b.com", "short")).await;
        assert!(matches!(result, Err(UserServiceError::WeakPassword)));
    }

    #[tokio::test]
    async fn test_create_user_invalid_email() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let result = service
            .create_user(create_request("not-an-email", "password123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_unknown_status() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let mut request = create_request("a@b.com", "password123");
        request.status = Some("moderator".to_string());
        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::InvalidStatus)));
    }

    #[tokio::test]
    async fn test_create_user_missing_first_name() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let mut request = create_request("a@b.com", "password123");
        request.first_name = "   ".to_string();
        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::MissingFirstName)));
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_email_taken() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_create_user()
            .times(1)
            .returning(|_| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let service = UserService::new(Arc::new(mock_repo));
        let result = service
            .create_user(create_request("taken@example.com", "password123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::EmailTaken)));
    }
}
