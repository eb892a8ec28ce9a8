//! Patronage - payments, entitlements, and content access for a blogging platform.
//!
//! Buyers pay for subscription tiers, single posts, or donations through a
//! hosted payment gateway. Confirmed payments become entitlements, entitlements
//! decide who may read which post, and periodic workers keep derived counters,
//! goals, expiries, and owner payouts in line with their sources.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
