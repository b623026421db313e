//! Unified error types for level construction and registry operations
//!
//! Agent-facing interaction failures use [`crate::results::ActionError`]
//! instead; `DomainError` is what builders of a level see when they wire
//! rooms, entities and connectors together incorrectly.

use thiserror::Error;

/// Unified error type for construction-time domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity or room not found in the registry
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The object was already registered with a world
    #[error("Already registered: {entity_type} '{name}' already belongs to a world")]
    AlreadyRegistered {
        entity_type: &'static str,
        name: String,
    },

    /// Business rule violation (membership, containment, pairing)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A position lies outside the room it is placed in
    #[error("Position ({x}, {y}) does not fit in room {room} ({extend_x}, {extend_y})")]
    OutOfBounds {
        room: String,
        x: f64,
        y: f64,
        extend_x: f64,
        extend_y: f64,
    },
}

impl DomainError {
    /// Creates a validation error for invalid field values.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create an already-registered error
    pub fn already_registered(entity_type: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            entity_type,
            name: name.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for Depth {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "FULL" => Ok(Self::Full),
    ///             _ => Err(DomainError::parse(format!("Unknown depth: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
