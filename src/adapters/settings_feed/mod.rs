//! Runtime settings feed - pushes [`SettingsUpdate`]s into the settings writer.
//!
//! [`SettingsUpdate`]: crate::config::SettingsUpdate

mod redis;

pub use self::redis::{parse_update, RedisSettingsFeed};
