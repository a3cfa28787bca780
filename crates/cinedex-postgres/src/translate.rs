//! Constraint-violation translation.
//!
//! Unique violations on the two declared constraints become typed
//! duplicate errors; everything else propagates as-is. The typed signal
//! from the driver (error kind + constraint name) is the primary
//! mechanism; message-text matching is a fallback only, gated on the
//! Postgres unique-violation phrasing so unrecognized integrity failures
//! are never misclassified as a known conflict.

use sqlx::error::ErrorKind;

use cinedex::StoreError;

const FILM_TITLE_CONSTRAINT: &str = "films_title_key";
const ACTOR_NAME_CONSTRAINT: &str = "actors_name_key";

const UNIQUE_VIOLATION_TEXT: &str = "duplicate key value violates unique constraint";

pub(crate) fn translate(err: sqlx::Error) -> StoreError {
    match classify(&err) {
        Some(store_err) => store_err,
        None => StoreError::Unexpected(err.into()),
    }
}

fn classify(err: &sqlx::Error) -> Option<StoreError> {
    let db = err.as_database_error()?;
    match db.kind() {
        ErrorKind::UniqueViolation => match db.constraint() {
            Some(constraint) => by_constraint(constraint),
            None => by_message(db.message()),
        },
        // driver reported no typed kind; the message gate decides
        ErrorKind::Other => by_message(db.message()),
        _ => None,
    }
}

fn by_constraint(constraint: &str) -> Option<StoreError> {
    match constraint {
        FILM_TITLE_CONSTRAINT => Some(StoreError::DuplicateTitle),
        ACTOR_NAME_CONSTRAINT => Some(StoreError::DuplicateActorName),
        // a unique violation we did not design for: fail loud
        _ => None,
    }
}

fn by_message(message: &str) -> Option<StoreError> {
    if !message.contains(UNIQUE_VIOLATION_TEXT) {
        return None;
    }
    if message.contains(FILM_TITLE_CONSTRAINT) {
        Some(StoreError::DuplicateTitle)
    } else if message.contains(ACTOR_NAME_CONSTRAINT) {
        Some(StoreError::DuplicateActorName)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_translate() {
        assert!(matches!(
            by_constraint("films_title_key"),
            Some(StoreError::DuplicateTitle)
        ));
        assert!(matches!(
            by_constraint("actors_name_key"),
            Some(StoreError::DuplicateActorName)
        ));
    }

    #[test]
    fn unknown_constraint_is_not_masked() {
        assert!(by_constraint("films_pkey").is_none());
        assert!(by_constraint("film_actors_actor_id_fkey").is_none());
    }

    #[test]
    fn message_fallback_gates_on_unique_violation_text() {
        let msg = "duplicate key value violates unique constraint \"films_title_key\"";
        assert!(matches!(by_message(msg), Some(StoreError::DuplicateTitle)));

        let msg = "duplicate key value violates unique constraint \"actors_name_key\"";
        assert!(matches!(
            by_message(msg),
            Some(StoreError::DuplicateActorName)
        ));
    }

    #[test]
    fn unrecognized_messages_pass_through() {
        assert!(by_message("deadlock detected").is_none());
        assert!(by_message(
            "insert or update on table \"film_actors\" violates foreign key constraint"
        )
        .is_none());
        // unique violation on a constraint we do not know
        assert!(by_message(
            "duplicate key value violates unique constraint \"films_pkey\""
        )
        .is_none());
    }
}
