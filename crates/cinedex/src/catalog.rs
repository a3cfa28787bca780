//! The narrow service surface consumed by the boundary layer.

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::{Film, FilmDraft, FilmId};
use crate::store::CatalogStore;
use crate::validate;

/// The only operations exposed upward: create and fetch.
///
/// The store is composed privately; nothing outside this type can reach
/// the undecorated storage surface, so every write necessarily goes
/// through validation and reconciliation.
pub struct Catalog<S> {
    store: S,
}

impl<S: CatalogStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and persist a submitted film.
    ///
    /// All field violations are reported at once; nothing is persisted on
    /// validation failure. Uniqueness cannot be pre-checked without a
    /// race, so duplicate titles and actor names surface as
    /// [`CatalogError::Conflict`] at commit time. No automatic retry.
    pub async fn create_film(&self, draft: FilmDraft) -> Result<Film, CatalogError> {
        validate::validate_film(&draft).map_err(CatalogError::Validation)?;

        debug!(title = %draft.title, cast = draft.actors.len(), "submitting film");
        let film = self.store.submit(draft).await?;
        info!(id = %film.id, title = %film.title, "film created");
        Ok(film)
    }

    /// Fetch a film with its cast.
    pub async fn film(&self, id: FilmId) -> Result<Film, CatalogError> {
        match self.store.film(id).await? {
            Some(film) => Ok(film),
            None => Err(CatalogError::not_found("film", [("id", id.0)])),
        }
    }
}
