//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod location;
mod security;
mod user;

pub use audit::{UserCreatedChanges, UserDeletedChanges, UserUpdatedChanges};
pub use location::{LocationId, ensure_locations_accessible, require_location_selection};
pub use security::{
    DEFAULT_USER_MANAGEMENT_LEVEL, GuardedAction, PermissionId, PermissionSet, RoleLevel,
    RolePermissionSetId, UserAuditAction, authorize_permission_grant,
};
pub use user::{EmailAddress, UserId, normalize_display_name};
