use std::collections::BTreeSet;

use certus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Granular permission identifier stored in a permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i32);

impl PermissionId {
    /// Wraps a stored permission identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Identifier of a named role permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissionSetId(i64);

impl RolePermissionSetId {
    /// Wraps a stored permission set identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RolePermissionSetId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Seniority of a role. Higher values outrank lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleLevel(i32);

impl RoleLevel {
    /// Level held by account owners.
    pub const OWNER: Self = Self(5);

    /// Wraps a stored role level.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Minimum role level allowed to manage users when an account has no setting.
pub const DEFAULT_USER_MANAGEMENT_LEVEL: RoleLevel = RoleLevel::OWNER;

/// Set of permission identifiers attached to a role permission set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<PermissionId>);

impl PermissionSet {
    /// Returns true when every permission in `target` is also held here.
    #[must_use]
    pub fn covers(&self, target: &PermissionSet) -> bool {
        target.0.is_subset(&self.0)
    }

    /// Returns true when the set holds no permissions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the permissions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = PermissionId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<PermissionId> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<i32>> for PermissionSet {
    fn from(value: Vec<i32>) -> Self {
        value.into_iter().map(PermissionId::new).collect()
    }
}

/// User-management action checked by the escalation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    /// Assigning a permission set to a user being created.
    CreateWithRole,
    /// Modifying a user holding the target permission set.
    UpdateUser,
    /// Assigning a new permission set to an existing user.
    AssignRole,
    /// Deleting a user holding the target permission set.
    DeleteUser,
}

impl GuardedAction {
    fn missing_actor_message(self) -> &'static str {
        match self {
            Self::CreateWithRole => "creator role not found",
            Self::UpdateUser | Self::AssignRole | Self::DeleteUser => "your role was not found",
        }
    }

    fn missing_target_message(self) -> &'static str {
        match self {
            Self::CreateWithRole | Self::AssignRole => "target role not found",
            Self::UpdateUser | Self::DeleteUser => "target user not found",
        }
    }

    fn denied_message(self) -> &'static str {
        match self {
            Self::CreateWithRole => {
                "you do not have sufficient permissions to create users with this role"
            }
            Self::UpdateUser => "you cannot update users with higher permissions than yours",
            Self::AssignRole => "you do not have sufficient permissions to assign this role",
            Self::DeleteUser => "you cannot delete users with higher permissions than yours",
        }
    }
}

/// Escalation guard: an actor may act on a permission set only when it
/// holds every permission in that set.
///
/// A missing actor set is denied, a missing target is reported as not found.
pub fn authorize_permission_grant(
    action: GuardedAction,
    actor: Option<&PermissionSet>,
    target: Option<&PermissionSet>,
) -> AppResult<()> {
    let actor = actor.ok_or_else(|| AppError::Forbidden(action.missing_actor_message().to_owned()))?;
    let target =
        target.ok_or_else(|| AppError::NotFound(action.missing_target_message().to_owned()))?;

    if actor.covers(target) {
        Ok(())
    } else {
        Err(AppError::Forbidden(action.denied_message().to_owned()))
    }
}

/// Stable audit actions recorded for user-management changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAuditAction {
    /// A user account was created.
    Created,
    /// A user account was updated.
    Updated,
    /// A user account was deleted.
    Deleted,
}

impl UserAuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use certus_core::AppError;
    use proptest::prelude::*;

    use super::{GuardedAction, PermissionSet, authorize_permission_grant};

    fn set(values: &[i32]) -> PermissionSet {
        PermissionSet::from(values.to_vec())
    }

    #[test]
    fn equal_sets_are_grantable() {
        let owner = set(&[1, 2, 3]);
        assert!(
            authorize_permission_grant(GuardedAction::CreateWithRole, Some(&owner), Some(&owner))
                .is_ok()
        );
    }

    #[test]
    fn empty_target_is_always_grantable() {
        let actor = set(&[]);
        assert!(
            authorize_permission_grant(
                GuardedAction::AssignRole,
                Some(&actor),
                Some(&PermissionSet::default())
            )
            .is_ok()
        );
    }

    #[test]
    fn superset_target_is_denied() {
        let result = authorize_permission_grant(
            GuardedAction::DeleteUser,
            Some(&set(&[1, 2])),
            Some(&set(&[1, 2, 7])),
        );
        assert!(matches!(result, Err(AppError::Forbidden(message)) if message.contains("delete")));
    }

    #[test]
    fn missing_actor_is_denied() {
        let result =
            authorize_permission_grant(GuardedAction::UpdateUser, None, Some(&set(&[1])));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn missing_target_is_not_found() {
        let result =
            authorize_permission_grant(GuardedAction::CreateWithRole, Some(&set(&[1])), None);
        assert!(matches!(result, Err(AppError::NotFound(message)) if message == "target role not found"));
    }

    proptest! {
        #[test]
        fn grant_is_permitted_exactly_for_subsets(
            actor in proptest::collection::btree_set(0_i32..24, 0..12),
            target in proptest::collection::btree_set(0_i32..24, 0..12),
        ) {
            let actor_set = set(&actor.iter().copied().collect::<Vec<_>>());
            let target_set = set(&target.iter().copied().collect::<Vec<_>>());

            let permitted = authorize_permission_grant(
                GuardedAction::AssignRole,
                Some(&actor_set),
                Some(&target_set),
            )
            .is_ok();

            prop_assert_eq!(permitted, target.is_subset(&actor));
        }

        #[test]
        fn duplicate_ids_do_not_change_the_outcome(
            ids in proptest::collection::vec(0_i32..8, 0..10),
        ) {
            let mut doubled = ids.clone();
            doubled.extend(ids.iter().copied());
            let unique: BTreeSet<i32> = ids.iter().copied().collect();

            prop_assert!(set(&unique.into_iter().collect::<Vec<_>>()).covers(&set(&doubled)));
        }
    }
}
