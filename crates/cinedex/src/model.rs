//! Domain model: films, actors, and the actor natural key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned surrogate id of a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(pub i64);

/// Storage-assigned surrogate id of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub i64);

impl fmt::Display for FilmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An actor's natural key: the (last_name, first_name) pair.
///
/// Case-sensitive, exact match. Two submitted actors with equal names are
/// the same real-world person and must resolve to the same surrogate id;
/// storage enforces this with `UNIQUE (last_name, first_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorName {
    pub last_name: String,
    pub first_name: String,
}

impl ActorName {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
        }
    }

    /// A degenerate key (blank component) is never looked up; validation
    /// rejects it before reconciliation runs.
    pub fn is_blank(&self) -> bool {
        self.last_name.trim().is_empty() || self.first_name.trim().is_empty()
    }
}

impl fmt::Display for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// A persisted actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub last_name: String,
    pub first_name: String,
}

impl Actor {
    pub fn name(&self) -> ActorName {
        ActorName::new(self.last_name.clone(), self.first_name.clone())
    }
}

/// A persisted film with its cast eagerly loaded, in submission order.
///
/// Complete and detached: no field requires further storage access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub actors: Vec<Actor>,
}

/// A submitted film, before any id has been assigned.
///
/// All fields default so that structural validation (not deserialization)
/// reports missing required fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilmDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actors: Vec<ActorDraft>,
}

/// A submitted cast member.
///
/// Carries either an explicit `id` (a reference to an existing row) or a
/// name pair to be reconciled against storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorDraft {
    #[serde(default)]
    pub id: Option<ActorId>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
}

impl ActorDraft {
    pub fn name(&self) -> ActorName {
        ActorName::new(self.last_name.clone(), self.first_name.clone())
    }
}
