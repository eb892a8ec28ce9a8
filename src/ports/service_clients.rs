//! Ports to neighbouring services called by the workers.

use async_trait::async_trait;

use crate::domain::foundation::{Amount, DomainError, PostId, UserId};

/// Comments service.
#[async_trait]
pub trait CommentCounter: Send + Sync {
    /// Live number of comments under a post.
    async fn count_for(&self, post_id: PostId) -> Result<i64, DomainError>;
}

/// Users service wallet.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Adds roubles to a user's wallet.
    ///
    /// The service treats a repeated `idempotency_key` as the same credit.
    async fn credit_rub(
        &self,
        user_id: UserId,
        value: Amount,
        idempotency_key: &str,
    ) -> Result<(), DomainError>;
}
