//! Content handlers.

mod check_post_access;

pub use check_post_access::{CheckPostAccessHandler, CheckPostAccessQuery};
