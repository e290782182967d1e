//! Application services and ports.

#![forbid(unsafe_code)]

mod identity_ports;
mod sign_in_service;
mod user_access_ports;
mod user_audit_ports;
mod user_management_service;

#[cfg(test)]
mod test_support;

pub use identity_ports::{
    IdentityProvider, IdentityUser, NewIdentity, ProviderSession, SignInLinkRequest,
};
pub use sign_in_service::{PkceChallenge, SignInOutcome, SignInService, UserAccessStatus};
pub use user_access_ports::{
    AccountMemberLocation, LocationAccessRecord, RolePermissionSetRecord, UserAccessRepository,
    UserRole, UserRoleAssignment,
};
pub use user_audit_ports::{UserAuditEntry, UserAuditRepository};
pub use user_management_service::{
    AccountUser, AccountUserLocation, CreateUserInput, ManagementCapability, UpdateUserInput,
    UserManagementService,
};
