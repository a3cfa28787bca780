//! Testing utilities for the cinedex catalog.
//!
//! [`MemoryCatalogStore`] implements `CatalogStore` against in-process
//! state with the same observable behavior as the Postgres store:
//! uniqueness is re-checked when the write is applied (not when the
//! snapshot was taken), and a failed submission leaves state untouched.
//!
//! The lookup and apply phases are public so tests can interleave two
//! submissions around a shared stale snapshot and reproduce the
//! concurrent-submit race deterministically, without timing tricks.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cinedex::reconcile::{self, CastSlot, ReconciledFilm};
use cinedex::{Actor, ActorDraft, ActorId, ActorName, CatalogStore, Film, FilmDraft, FilmId, StoreError};


#[derive(Debug, Clone)]
struct FilmRow {
    title: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    cast: Vec<ActorId>,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_film_id: i64,
    next_actor_id: i64,
    films: BTreeMap<i64, FilmRow>,
    actors: BTreeMap<i64, ActorName>,
}

impl State {
    fn actor_id_by_name(&self, name: &ActorName) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(id, _)| ActorId(*id))
    }

    fn film(&self, id: FilmId) -> Option<Film> {
        let row = self.films.get(&id.0)?;
        let actors = row
            .cast
            .iter()
            .map(|actor_id| {
                let name = &self.actors[&actor_id.0];
                Actor {
                    id: *actor_id,
                    last_name: name.last_name.clone(),
                    first_name: name.first_name.clone(),
                }
            })
            .collect();
        Some(Film {
            id,
            title: row.title.clone(),
            description: row.description.clone(),
            created_at: row.created_at,
            actors,
        })
    }
}

/// In-memory catalog store.
#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    inner: Arc<Mutex<State>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup phase of submit: which of `keys` already have a row.
    ///
    /// Exposed so a test can take a snapshot, let another submission
    /// commit, and then apply against the now-stale snapshot.
    pub fn lookup(&self, keys: &[ActorName]) -> HashMap<ActorName, ActorId> {
        let state = self.inner.lock().unwrap();
        keys.iter()
            .filter_map(|key| state.actor_id_by_name(key).map(|id| (key.clone(), id)))
            .collect()
    }

    /// Insert phase of submit: apply a reconciled graph to the current
    /// state, enforcing the constraints the database schema declares.
    ///
    /// Copy-on-write: on any error the store is exactly as it was, the
    /// same all-or-nothing guarantee a rolled-back transaction gives.
    pub fn apply(&self, plan: &ReconciledFilm) -> Result<Film, StoreError> {
        let mut state = self.inner.lock().unwrap();
        let mut next = state.clone();

        if next.films.values().any(|f| f.title == plan.title) {
            return Err(StoreError::DuplicateTitle);
        }

        // Constraints bind at write time, not snapshot time; an insert
        // planned from a stale snapshot fails here just as it would
        // against the database's unique index.
        let mut new_ids = Vec::with_capacity(plan.inserts.len());
        for name in &plan.inserts {
            if next.actor_id_by_name(name).is_some() {
                return Err(StoreError::DuplicateActorName);
            }
            next.next_actor_id += 1;
            next.actors.insert(next.next_actor_id, name.clone());
            new_ids.push(ActorId(next.next_actor_id));
        }

        let mut cast = Vec::with_capacity(plan.cast.len());
        for slot in &plan.cast {
            let actor_id = match slot {
                CastSlot::Existing(id) => *id,
                CastSlot::New { idx } => new_ids[*idx],
            };
            if !next.actors.contains_key(&actor_id.0) {
                // foreign key violation; not a uniqueness conflict
                return Err(StoreError::Unexpected(anyhow!(
                    "no actor with id {actor_id}"
                )));
            }
            cast.push(actor_id);
        }

        next.next_film_id += 1;
        let film_id = FilmId(next.next_film_id);
        next.films.insert(
            film_id.0,
            FilmRow {
                title: plan.title.clone(),
                description: plan.description.clone(),
                created_at: Utc::now(),
                cast,
            },
        );

        let film = next.film(film_id).expect("film row just inserted");
        *state = next;
        Ok(film)
    }

    pub fn film_count(&self) -> usize {
        self.inner.lock().unwrap().films.len()
    }

    pub fn actor_count(&self) -> usize {
        self.inner.lock().unwrap().actors.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn submit(&self, draft: FilmDraft) -> Result<Film, StoreError> {
        let keys = reconcile::lookup_keys(&draft);
        let existing = self.lookup(&keys);
        let plan = reconcile::reconcile(&draft, &existing);
        self.apply(&plan)
    }

    async fn film(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        Ok(self.inner.lock().unwrap().film(id))
    }

    async fn delete_film(&self, id: FilmId) -> Result<(), StoreError> {
        // cast links vanish with the film row; shared actors stay
        self.inner.lock().unwrap().films.remove(&id.0);
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A draft with the given title and no cast.
pub fn film_draft(title: &str) -> FilmDraft {
    FilmDraft {
        title: title.to_string(),
        description: None,
        actors: Vec::new(),
    }
}

/// An id-less cast entry, to be reconciled by name.
pub fn cast_member(last_name: &str, first_name: &str) -> ActorDraft {
    ActorDraft {
        id: None,
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
    }
}

/// A cast entry referencing an existing actor by id.
pub fn cast_ref(id: ActorId) -> ActorDraft {
    ActorDraft {
        id: Some(id),
        ..ActorDraft::default()
    }
}
