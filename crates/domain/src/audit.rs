//! Typed change payloads recorded in the user audit log.

use serde::Serialize;

use crate::{LocationId, RolePermissionSetId};

/// Changes recorded when a user account is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCreatedChanges {
    /// Normalized email of the new account.
    pub email: String,
    /// Display name given at creation, if any.
    pub full_name: Option<String>,
    /// Permission set assigned to the new account.
    pub role_permission_id: RolePermissionSetId,
    /// Locations granted to the new account.
    pub location_ids: Vec<LocationId>,
}

/// Changes recorded when a user account is updated.
///
/// Only fields that were written appear in the serialized payload. A
/// cleared display name is recorded as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdatedChanges {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Option<String>>,
    /// New permission set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_permission_id: Option<RolePermissionSetId>,
    /// Replacement location list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_ids: Option<Vec<LocationId>>,
}

impl UserUpdatedChanges {
    /// Returns true when no field was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.role_permission_id.is_none()
            && self.location_ids.is_none()
    }
}

/// Changes recorded when a user account is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDeletedChanges {
    /// Deletion timestamp in RFC3339.
    pub deleted_at: String,
}

#[cfg(test)]
mod tests {
    use super::UserUpdatedChanges;

    #[test]
    fn display_name_only_update_serializes_one_key() {
        let changes = UserUpdatedChanges {
            display_name: Some(Some("Sam".to_owned())),
            ..UserUpdatedChanges::default()
        };

        let payload = serde_json::to_value(&changes).unwrap_or_default();
        assert_eq!(payload, serde_json::json!({ "display_name": "Sam" }));
    }

    #[test]
    fn cleared_display_name_serializes_as_null() {
        let changes = UserUpdatedChanges {
            display_name: Some(None),
            ..UserUpdatedChanges::default()
        };

        let payload = serde_json::to_value(&changes).unwrap_or_default();
        assert_eq!(payload, serde_json::json!({ "display_name": null }));
        assert!(!changes.is_empty());
    }

    #[test]
    fn default_changes_are_empty() {
        assert!(UserUpdatedChanges::default().is_empty());
    }
}
