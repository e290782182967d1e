use std::collections::BTreeSet;

use certus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a physical business location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(Uuid);

impl LocationId {
    /// Creates a location identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Rejects an empty location selection.
pub fn require_location_selection(requested: &[LocationId]) -> AppResult<()> {
    if requested.is_empty() {
        return Err(AppError::Validation(
            "at least one location must be selected".to_owned(),
        ));
    }

    Ok(())
}

/// Ensures every requested location is already accessible to the actor.
pub fn ensure_locations_accessible(
    requested: &[LocationId],
    accessible: &BTreeSet<LocationId>,
) -> AppResult<()> {
    if requested
        .iter()
        .all(|location_id| accessible.contains(location_id))
    {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you do not have access to some of the specified locations".to_owned(),
        ))
    }
}
