use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct TransactionId(pub usize);

impl TransactionId {
    pub fn new_first_transaction() -> TransactionId {
        TransactionId(0)
    }

    pub fn to_number(&self) -> usize {
        self.0
    }

    pub fn increment(&self) -> TransactionId {
        TransactionId(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityIdError {
    #[error("Malformed id, expected a UUID: {0}")]
    Malformed(String),
}

/// Identifier of a person row, always a UUID in its canonical hyphenated form
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(String);

impl EntityId {
    pub fn new() -> EntityId {
        EntityId(Uuid::new_v4().to_string())
    }

    /// Validates an identifier supplied by a client. Ids that differ only in
    /// letter case or hyphenation refer to the same row.
    pub fn parse(id: &str) -> Result<EntityId, EntityIdError> {
        Uuid::parse_str(id)
            .map(|uuid| EntityId(uuid.hyphenated().to_string()))
            .map_err(|_| EntityIdError::Malformed(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
