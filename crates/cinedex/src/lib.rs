//! # Cinedex
//!
//! Core of a small film catalog backend: a film references an ordered cast
//! of actors, actors are shared across films (many-to-many), and clients
//! submit a film together with its cast in one request, identifying actors
//! only by name.
//!
//! The interesting part is the **reconciliation protocol**: deciding, at
//! submit time, which of the submitted actors already exist in storage
//! (attach by id) and which are genuinely new (insert), and committing the
//! whole graph atomically.
//!
//! ## Architecture
//!
//! ```text
//! Edge (HTTP, out of scope)
//!     │
//!     ▼ FilmDraft
//! Catalog ── validate() ──► Violations (all of them, not just the first)
//!     │
//!     ▼ submit()
//! CatalogStore (port) ─── one transaction ───────────────┐
//!     │                                                  │
//!     ├─► batched natural-key lookup (single round trip) │
//!     ├─► reconcile() ─► ReconciledFilm (pure)           │
//!     └─► insert film + new actors + cast rows ──────────┘
//!                 │
//!                 └─► unique violation? → StoreError → CatalogError::Conflict
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Natural keys are identity** - two actors with the same
//!    (last_name, first_name) are the same row, never two inserts
//! 2. **Reconciliation is keyed by name, never by list position** -
//!    duplicate names within one submission share one target
//! 3. **Commit-or-nothing** - the film row, new actor rows, and cast rows
//!    land in one transaction; a losing writer commits nothing
//! 4. **No application-level locking** - the lookup/insert race is settled
//!    by the storage engine's uniqueness constraint and surfaced as a
//!    typed conflict; the client retries
//! 5. **No partially loaded graphs** - fetches are eager; a returned
//!    [`Film`] never needs further storage access
//!
//! ## What This Is Not
//!
//! No HTTP routing, no schema migration tooling, no authentication, no
//! pagination. The storage engine itself lives behind [`CatalogStore`];
//! `cinedex-postgres` is the production implementation.

mod catalog;
mod error;
mod model;
mod store;

pub mod reconcile;
pub mod validate;

pub use catalog::Catalog;
pub use error::{CatalogError, StoreError};
pub use model::{Actor, ActorDraft, ActorId, ActorName, Film, FilmDraft, FilmId};
pub use store::CatalogStore;

// Re-export commonly used external types
pub use async_trait::async_trait;
