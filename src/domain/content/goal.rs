//! Blog goals and how their progress is measured.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::domain::foundation::{BlogId, GoalId, ValidationError};

/// What a goal counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum GoalType {
    /// Number of followers of the blog.
    Followers,
    /// Number of active paid subscribers.
    PaidSubscribers,
    /// Total income in roubles.
    IncomeRub,
    /// Summed monthly price of active paid subscriptions.
    ActiveSubscriptionValue,
}

impl GoalType {
    pub fn code(&self) -> i16 {
        match self {
            GoalType::Followers => 1,
            GoalType::PaidSubscribers => 2,
            GoalType::IncomeRub => 3,
            GoalType::ActiveSubscriptionValue => 4,
        }
    }
}

impl TryFrom<i16> for GoalType {
    type Error = ValidationError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(GoalType::Followers),
            2 => Ok(GoalType::PaidSubscribers),
            3 => Ok(GoalType::IncomeRub),
            4 => Ok(GoalType::ActiveSubscriptionValue),
            other => Err(ValidationError::out_of_range("goal_type", 1, 4, other)),
        }
    }
}

impl From<GoalType> for i16 {
    fn from(goal_type: GoalType) -> i16 {
        goal_type.code()
    }
}

/// A target a blog owner tracks. `current` is recomputed from scratch each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub blog_id: BlogId,
    pub goal_type: GoalType,
    pub target: Decimal,
    pub current: Decimal,
}

impl Goal {
    pub fn is_reached(&self) -> bool {
        self.current >= self.target
    }
}

/// Per-blog aggregates from which every goal type can be measured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogMetrics {
    pub followers: i64,
    pub paid_subscribers: i64,
    pub income_rub: Decimal,
    pub active_subscription_value: Decimal,
}

impl BlogMetrics {
    /// Progress value for a goal of the given type.
    pub fn measure(&self, goal_type: GoalType) -> Decimal {
        match goal_type {
            GoalType::Followers => Decimal::from(self.followers),
            GoalType::PaidSubscribers => Decimal::from(self.paid_subscribers),
            GoalType::IncomeRub => self.income_rub,
            GoalType::ActiveSubscriptionValue => self.active_subscription_value,
        }
    }
}
