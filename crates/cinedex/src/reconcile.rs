//! Entity reconciliation: rewriting a submitted film graph so that actors
//! matching an existing natural key are attached instead of re-inserted.
//!
//! This is the pure half of submit. Store implementations call
//! [`lookup_keys`] to know which names to look up, run their single
//! batched existence query, then call [`reconcile`] with the result -
//! all inside the submit transaction, so the existence snapshot stays
//! valid through the insert (see `CatalogStore::submit`).
//!
//! Without this step, posting a new film whose actor already exists would
//! trip the `UNIQUE (last_name, first_name)` constraint, and the only
//! workaround would be a client-visible find-actor-by-name endpoint.

use std::collections::HashMap;

use crate::model::{ActorId, ActorName, FilmDraft};

/// One cast position in a reconciled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastSlot {
    /// Attach a row that already exists in storage.
    Existing(ActorId),
    /// Insert `inserts[idx]` and attach the generated id.
    New { idx: usize },
}

/// A film graph rewritten for persistence.
///
/// `cast` preserves the submitted order; `inserts` holds each genuinely
/// new actor exactly once, so duplicate names within one submission share
/// a single insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledFilm {
    pub title: String,
    pub description: Option<String>,
    pub cast: Vec<CastSlot>,
    pub inserts: Vec<ActorName>,
}

/// Distinct natural keys to look up for a draft, in first-seen order.
///
/// Only id-less drafts with a non-blank name participate; explicit-id
/// drafts pass through untouched and degenerate keys are never looked up.
/// An empty result means the store must not issue a query at all.
pub fn lookup_keys(draft: &FilmDraft) -> Vec<ActorName> {
    let mut keys = Vec::new();
    for actor in &draft.actors {
        if actor.id.is_some() {
            continue;
        }
        let name = actor.name();
        if name.is_blank() {
            continue;
        }
        if !keys.contains(&name) {
            keys.push(name);
        }
    }
    keys
}

/// Merge a draft with the result of the batched natural-key lookup.
///
/// Reconciliation is keyed by [`ActorName`], never by list position:
/// two candidates sharing a name resolve to the same target, whether that
/// target is a reused row or a single pending insert.
pub fn reconcile(draft: &FilmDraft, existing: &HashMap<ActorName, ActorId>) -> ReconciledFilm {
    let mut cast = Vec::with_capacity(draft.actors.len());
    let mut inserts: Vec<ActorName> = Vec::new();
    let mut pending: HashMap<ActorName, usize> = HashMap::new();

    for actor in &draft.actors {
        if let Some(id) = actor.id {
            cast.push(CastSlot::Existing(id));
            continue;
        }

        let name = actor.name();
        if let Some(&id) = existing.get(&name) {
            cast.push(CastSlot::Existing(id));
            continue;
        }

        // Blank names get their own slot each; they never reached the
        // lookup and validation has already rejected them upstream.
        let idx = if name.is_blank() {
            inserts.push(name);
            inserts.len() - 1
        } else {
            *pending.entry(name.clone()).or_insert_with(|| {
                inserts.push(name);
                inserts.len() - 1
            })
        };
        cast.push(CastSlot::New { idx });
    }

    ReconciledFilm {
        title: draft.title.clone(),
        description: draft.description.clone(),
        cast,
        inserts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActorDraft;

    fn draft_actor(last: &str, first: &str) -> ActorDraft {
        ActorDraft {
            id: None,
            last_name: last.to_string(),
            first_name: first.to_string(),
        }
    }

    fn draft(actors: Vec<ActorDraft>) -> FilmDraft {
        FilmDraft {
            title: "Star Wars: The Empire Strikes Back".to_string(),
            description: None,
            actors,
        }
    }

    #[test]
    fn lookup_keys_skips_explicit_ids_and_blanks() {
        let mut with_id = draft_actor("Ford", "Harrison");
        with_id.id = Some(ActorId(7));

        let d = draft(vec![
            with_id,
            draft_actor("Hamill", "Mark"),
            draft_actor("", "Carrie"),
            draft_actor("Hamill", "Mark"), // duplicate
        ]);

        assert_eq!(lookup_keys(&d), vec![ActorName::new("Hamill", "Mark")]);
    }

    #[test]
    fn lookup_keys_empty_for_empty_cast() {
        assert!(lookup_keys(&draft(vec![])).is_empty());
    }

    #[test]
    fn found_keys_attach_absent_keys_insert() {
        let d = draft(vec![
            draft_actor("Ford", "Harrison"),
            draft_actor("Hamill", "Mark"),
        ]);
        let existing =
            HashMap::from([(ActorName::new("Ford", "Harrison"), ActorId(3))]);

        let plan = reconcile(&d, &existing);

        assert_eq!(
            plan.cast,
            vec![CastSlot::Existing(ActorId(3)), CastSlot::New { idx: 0 }]
        );
        assert_eq!(plan.inserts, vec![ActorName::new("Hamill", "Mark")]);
    }

    #[test]
    fn explicit_id_passes_through_unchanged() {
        let mut with_id = draft_actor("Fisher", "Carrie");
        with_id.id = Some(ActorId(42));
        let plan = reconcile(&draft(vec![with_id]), &HashMap::new());

        assert_eq!(plan.cast, vec![CastSlot::Existing(ActorId(42))]);
        assert!(plan.inserts.is_empty());
    }

    #[test]
    fn duplicate_name_in_one_submission_shares_one_insert() {
        let d = draft(vec![
            draft_actor("Ford", "Harrison"),
            draft_actor("Hamill", "Mark"),
            draft_actor("Ford", "Harrison"),
        ]);

        let plan = reconcile(&d, &HashMap::new());

        assert_eq!(
            plan.cast,
            vec![
                CastSlot::New { idx: 0 },
                CastSlot::New { idx: 1 },
                CastSlot::New { idx: 0 },
            ]
        );
        assert_eq!(plan.inserts.len(), 2);
    }

    #[test]
    fn duplicate_name_already_existing_shares_one_id() {
        let d = draft(vec![
            draft_actor("Ford", "Harrison"),
            draft_actor("Ford", "Harrison"),
        ]);
        let existing =
            HashMap::from([(ActorName::new("Ford", "Harrison"), ActorId(9))]);

        let plan = reconcile(&d, &existing);

        assert_eq!(
            plan.cast,
            vec![CastSlot::Existing(ActorId(9)), CastSlot::Existing(ActorId(9))]
        );
        assert!(plan.inserts.is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let d = draft(vec![
            draft_actor("Hamill", "Mark"),
            draft_actor("Ford", "Harrison"),
            draft_actor("Fisher", "Carrie"),
        ]);
        let existing =
            HashMap::from([(ActorName::new("Ford", "Harrison"), ActorId(1))]);

        let plan = reconcile(&d, &existing);

        assert_eq!(plan.cast.len(), 3);
        assert_eq!(plan.cast[1], CastSlot::Existing(ActorId(1)));
        assert_eq!(plan.inserts[0], ActorName::new("Hamill", "Mark"));
        assert_eq!(plan.inserts[1], ActorName::new("Fisher", "Carrie"));
    }

    #[test]
    fn blank_names_keep_their_own_slots() {
        let d = draft(vec![draft_actor("", "Carrie"), draft_actor("", "Carrie")]);
        let plan = reconcile(&d, &HashMap::new());

        // Degenerate keys are not deduplicated; validation rejects them
        // before a store ever sees this plan.
        assert_eq!(
            plan.cast,
            vec![CastSlot::New { idx: 0 }, CastSlot::New { idx: 1 }]
        );
    }
}
