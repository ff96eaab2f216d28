pub mod user;

pub use user::{
    AccountStatus, NewUser, PublicUser, SubscriptionStatus, SubscriptionUpdate, User,
    MIN_PASSWORD_LEN, TRIAL_PERIOD_DAYS,
};
