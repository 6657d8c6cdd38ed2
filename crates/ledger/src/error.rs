//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned when the input is malformed (non-positive
//!   amount, empty required text, over-settlement).
//! - [`Forbidden`] returned when a user acts on an organization it does not
//!   own.
//! - [`NotFound`] returned when an id does not exist in the addressed
//!   organization.
//! - [`Conflict`] returned when a compare-and-set update keeps losing against
//!   concurrent writers.
//! - [`Overflow`] returned when an aggregate no longer fits in [`Money`].
//!   Retrying does not help.
//! - [`Database`] returned when the store is unavailable. The caller may retry.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Overflow`]: EngineError::Overflow
//!  [`Money`]: crate::Money
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{entity} \"{id}\" not found!")]
    NotFound { entity: &'static str, id: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Overflow: {0}")]
    Overflow(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns `true` when the failure comes from the store and retrying the
    /// same call later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation {
                    field: fa,
                    reason: ra,
                },
                Self::Validation {
                    field: fb,
                    reason: rb,
                },
            ) => fa == fb && ra == rb,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (
                Self::NotFound {
                    entity: ea,
                    id: ia,
                },
                Self::NotFound {
                    entity: eb,
                    id: ib,
                },
            ) => ea == eb && ia == ib,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Overflow(a), Self::Overflow(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_field_and_id() {
        let err = EngineError::validation("amount", "must be > 0");
        assert_eq!(err.to_string(), "Invalid amount: must be > 0");

        let err = EngineError::not_found("obligation", "abc");
        assert_eq!(err.to_string(), "obligation \"abc\" not found!");
    }

    #[test]
    fn only_store_errors_are_transient() {
        assert!(EngineError::Database(DbErr::Custom("down".to_string())).is_transient());
        assert!(!EngineError::Conflict("lost".to_string()).is_transient());
        assert!(!EngineError::Forbidden("no".to_string()).is_transient());
        assert!(!EngineError::Overflow("income".to_string()).is_transient());
    }
}
