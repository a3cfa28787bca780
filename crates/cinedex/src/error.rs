//! Error taxonomy surfaced to the boundary layer.
//!
//! Four stable shapes: validation (caught before any persistence attempt),
//! conflict (uniqueness, detected only at commit time), not-found, and
//! unexpected. Unexpected storage faults propagate unchanged; they are
//! never coerced into a misleading conflict or not-found.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::validate::Violations;

/// Errors a store implementation can report.
///
/// Duplicate variants correspond to the two uniqueness constraints the
/// schema declares; everything else stays opaque.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a film with this title already exists")]
    DuplicateTitle,
    #[error("an actor with this name already exists")]
    DuplicateActorName,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Errors surfaced by [`Catalog`](crate::Catalog) operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One or more field constraints failed; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(Violations),

    /// A uniqueness invariant would be violated at commit time. The whole
    /// submission rolled back; the client may retry.
    #[error("{entity} conflict: {reason}")]
    Conflict {
        entity: &'static str,
        reason: &'static str,
    },

    /// The referenced entity does not exist. `criteria` holds the lookup
    /// attributes verbatim, for a precise user-facing message.
    #[error("could not find {entity} by {}", fmt_criteria(.criteria))]
    NotFound {
        entity: &'static str,
        criteria: Map<String, Value>,
    },

    /// Anything else from the storage layer, untranslated.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn not_found<V: Into<Value>>(
        entity: &'static str,
        criteria: impl IntoIterator<Item = (&'static str, V)>,
    ) -> Self {
        CatalogError::NotFound {
            entity,
            criteria: criteria
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTitle => CatalogError::Conflict {
                entity: "film",
                reason: "duplicate title",
            },
            StoreError::DuplicateActorName => CatalogError::Conflict {
                entity: "actor",
                reason: "duplicate name",
            },
            StoreError::Unexpected(e) => CatalogError::Unexpected(e),
        }
    }
}

fn fmt_criteria(criteria: &Map<String, Value>) -> String {
    criteria
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(",")
}
