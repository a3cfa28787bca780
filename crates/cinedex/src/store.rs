//! The storage port.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Film, FilmDraft, FilmId};

/// What the catalog requires from a relational store: a reconciling,
/// atomic submit and an eager fetch. Uniqueness is enforced by the store's
/// own constraint machinery, not by application-level locking.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Reconcile and persist a submitted film graph in one transaction.
    ///
    /// The film row, all newly inserted actor rows, and all cast rows
    /// commit together or not at all. The natural-key existence snapshot
    /// is taken inside the same transaction, so two concurrent submits
    /// introducing the same new actor cannot both commit: the loser's
    /// insert trips the uniqueness constraint and must surface as
    /// [`StoreError::DuplicateActorName`].
    ///
    /// On success the returned graph carries every surrogate id, generated
    /// for new rows and reused for attached ones.
    async fn submit(&self, draft: FilmDraft) -> Result<Film, StoreError>;

    /// Eagerly load a film with its full cast in one scope.
    ///
    /// `Ok(None)` when no row matches. A returned film is complete and
    /// detached; it never faults on access after the call returns.
    async fn film(&self, id: FilmId) -> Result<Option<Film>, StoreError>;

    /// Remove a film and its cast links. Actors are shared across films
    /// and survive. Test and administrative use only; there is no public
    /// delete operation.
    async fn delete_film(&self, id: FilmId) -> Result<(), StoreError>;
}
