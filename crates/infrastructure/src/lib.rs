//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod gotrue_identity_provider;
mod postgres_user_access_repository;
mod postgres_user_audit_repository;

pub use gotrue_identity_provider::GoTrueIdentityProvider;
pub use postgres_user_access_repository::PostgresUserAccessRepository;
pub use postgres_user_audit_repository::PostgresUserAuditRepository;

/// Embedded migrations for the user access schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
