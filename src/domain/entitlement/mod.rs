//! Entitlement domain module.
//!
//! Durable rights produced by payments and user actions: tier bindings,
//! single-post purchases, follows, donations, and the income they generate.
//!
//! # Module Structure
//!
//! - `user_subscription` - Viewer-to-tier binding and its paid period
//! - `subscription_status` - SubscriptionStatus state machine
//! - `income` - BlogIncome and per-owner wallet credits
//! - `donation` - Donations and their confirmation
//! - `relations` - UserFollow and PostPaidAccess
//! - `grant` - GrantRequest / GrantOutcome
//! - `notification` - Events pushed to owners and buyers
//! - `errors` - EntitlementError

mod donation;
mod errors;
mod grant;
mod income;
mod notification;
mod relations;
mod subscription_status;
mod user_subscription;

pub use donation::{Donation, DonationStatus};
pub use errors::EntitlementError;
pub use grant::{GrantOutcome, GrantRequest};
pub use income::{group_unsent, BlogIncome, WalletCredit};
pub use notification::{Notification, NotificationEvent};
pub use relations::{PostPaidAccess, UserFollow};
pub use subscription_status::SubscriptionStatus;
pub use user_subscription::{UserSubscription, PAID_PERIOD_HOURS};
