use async_trait::async_trait;

use certus_core::AppResult;
use certus_domain::{UserAuditAction, UserId};

/// Immutable audit entry describing one change to a user account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAuditEntry {
    /// Account that was changed.
    pub modified_user_id: UserId,
    /// Actor that made the change.
    pub modified_by_user_id: UserId,
    /// Stable audit action.
    pub action: UserAuditAction,
    /// Free-form change payload.
    pub changes: serde_json::Value,
}

/// Port for persisting append-only user audit entries.
#[async_trait]
pub trait UserAuditRepository: Send + Sync {
    /// Persists one audit entry.
    async fn append_entry(&self, entry: UserAuditEntry) -> AppResult<()>;
}
