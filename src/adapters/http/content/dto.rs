use serde::{Deserialize, Serialize};

use crate::domain::content::AccessDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResponse {
    pub has_access: bool,
}

impl From<&AccessDecision> for AccessResponse {
    fn from(decision: &AccessDecision) -> Self {
        Self {
            has_access: decision.is_granted(),
        }
    }
}
