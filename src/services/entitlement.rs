//! Effective-entitlement derivation.
//!
//! Stored billing state is a claim, not an answer: a `trial` row is only
//! worth anything while the trial window is open. Every caller that gates a
//! paid feature or renders subscription state goes through these functions
//! so the serving side and the display side can never drift apart.

use chrono::{DateTime, Utc};

use crate::models::user::SubscriptionStatus;

/// Whether the given billing state grants access right now.
///
/// `active` always grants access. `trial` grants access only while
/// `trial_ends_at` is present and in the future. Everything else, including
/// a trial with a missing or past expiry, grants nothing.
pub fn has_active_entitlement(
    status: SubscriptionStatus,
    trial_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match status {
        SubscriptionStatus::Active => true,
        SubscriptionStatus::Trial => trial_ends_at.map(|ends| ends > now).unwrap_or(false),
        SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => false,
    }
}

/// Whole days left on an unexpired trial, for "trial ends in N days" copy.
///
/// Returns `None` for anything that is not a live trial. Rounds up so a
/// trial ending later today still reads as one day remaining.
pub fn trial_days_remaining(
    status: SubscriptionStatus,
    trial_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    if status != SubscriptionStatus::Trial {
        return None;
    }
    let ends = trial_ends_at?;
    if ends <= now {
        return None;
    }
    let seconds = (ends - now).num_seconds();
    Some((seconds + 86_399) / 86_400)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn trial_with_future_end_is_entitled() {
        let now = Utc::now();
        assert!(has_active_entitlement(
            SubscriptionStatus::Trial,
            Some(now + Duration::days(1)),
            now
        ));
    }

    #[test]
    fn trial_with_past_end_is_not_entitled() {
        let now = Utc::now();
        assert!(!has_active_entitlement(
            SubscriptionStatus::Trial,
            Some(now - Duration::days(1)),
            now
        ));
    }

    #[test]
    fn trial_without_end_date_is_not_entitled() {
        assert!(!has_active_entitlement(
            SubscriptionStatus::Trial,
            None,
            Utc::now()
        ));
    }

    #[test]
    fn active_is_entitled_regardless_of_trial_end() {
        let now = Utc::now();
        assert!(has_active_entitlement(SubscriptionStatus::Active, None, now));
        assert!(has_active_entitlement(
            SubscriptionStatus::Active,
            Some(now - Duration::days(30)),
            now
        ));
    }

    #[test]
    fn other_statuses_are_not_entitled() {
        let now = Utc::now();
        let future = Some(now + Duration::days(5));
        assert!(!has_active_entitlement(SubscriptionStatus::Expired, future, now));
        assert!(!has_active_entitlement(SubscriptionStatus::Cancelled, future, now));
    }

    #[test]
    fn days_remaining_rounds_up_partial_days() {
        let now = Utc::now();
        let remaining = trial_days_remaining(
            SubscriptionStatus::Trial,
            Some(now + Duration::hours(36)),
            now,
        );
        assert_eq!(remaining, Some(2));
    }

    #[test]
    fn days_remaining_is_none_off_trial() {
        let now = Utc::now();
        let future = Some(now + Duration::days(3));
        assert_eq!(trial_days_remaining(SubscriptionStatus::Active, future, now), None);
        assert_eq!(
            trial_days_remaining(SubscriptionStatus::Trial, Some(now - Duration::days(1)), now),
            None
        );
        assert_eq!(trial_days_remaining(SubscriptionStatus::Trial, None, now), None);
    }
}
