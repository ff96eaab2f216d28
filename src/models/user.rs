use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::entitlement;

/// Length of the free trial granted at registration.
pub const TRIAL_PERIOD_DAYS: i64 = 14;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Intent signal chosen at registration, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountStatus {
    Quilter,
    Designer,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Quilter => "quilter",
            AccountStatus::Designer => "designer",
        }
    }

    /// Parse a user-supplied status string. Returns `None` for anything
    /// outside the accepted set so callers can reject it as bad input.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "quilter" => Some(AccountStatus::Quilter),
            "designer" => Some(AccountStatus::Designer),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored billing state. Effective entitlement is always derived from this
/// plus `trial_ends_at` via the evaluator, never read back directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trial" => Some(SubscriptionStatus::Trial),
            "active" => Some(SubscriptionStatus::Active),
            "expired" => Some(SubscriptionStatus::Expired),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub display_name: Option<String>,
    pub status: AccountStatus,
    pub subscription_status: SubscriptionStatus,
    pub subscription_plan: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        entitlement::has_active_entitlement(self.subscription_status, self.trial_ends_at, now)
    }
}

/// Insert payload for the repository. Built by the user service after
/// validation and hashing; never constructed from raw client input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub display_name: Option<String>,
    pub status: AccountStatus,
    pub subscription_status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

/// Billing-driven state change applied through the repository seam.
#[derive(Debug, Clone)]
pub struct SubscriptionUpdate {
    pub subscription_status: SubscriptionStatus,
    pub subscription_plan: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

/// The subset of a user record safe to return across the trust boundary.
///
/// Converting through this type is the only way user data leaves the API;
/// there is no field-stripping by convention anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub display_name: Option<String>,
    pub status: AccountStatus,
    pub subscription_status: SubscriptionStatus,
    pub subscription_plan: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            display_name: user.display_name,
            status: user.status,
            subscription_status: user.subscription_status,
            subscription_plan: user.subscription_plan,
            trial_ends_at: user.trial_ends_at,
        }
    }
}

impl PublicUser {
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        entitlement::has_active_entitlement(self.subscription_status, self.trial_ends_at, now)
    }

    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        entitlement::trial_days_remaining(self.subscription_status, self.trial_ends_at, now)
    }
}
