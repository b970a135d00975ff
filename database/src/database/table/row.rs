use serde::{Deserialize, Serialize};

use crate::{
    consts::consts::{EntityId, TransactionId},
    model::person::Person,
};

use super::table::ApplyErrors;

#[derive(Debug)]
pub struct ApplyUpdateResult {
    pub previous: Person,
    pub current: Person,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdatePersonData {
    pub name: UpdateStatement,
    pub number: UpdateStatement,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum UpdateStatement {
    Set(String),
    NoChanges,
}

impl From<Option<String>> for UpdateStatement {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => UpdateStatement::Set(v),
            None => UpdateStatement::NoChanges,
        }
    }
}

/// Undoes a single applied mutation, used when the transaction log could not persist it
#[derive(Clone, Debug, PartialEq)]
pub enum RollbackAction {
    /// The mutation created the row
    DropRow(EntityId),
    /// The mutation replaced or removed the row, put the previous row back
    RestoreRow(PersonRow),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PersonRow {
    pub person: Person,
    /// Transaction that created the row, gives the table its insertion order
    pub created_at: TransactionId,
}

impl PersonRow {
    pub fn new(person: Person, created_at: TransactionId) -> Self {
        PersonRow { person, created_at }
    }

    pub fn apply_update(
        &mut self,
        update: &UpdatePersonData,
    ) -> Result<ApplyUpdateResult, ApplyErrors> {
        let previous = self.person.clone();
        let mut current = previous.clone();

        current.name = required_field("name", &update.name, current.name)?;
        current.number = required_field("number", &update.number, current.number)?;

        self.person = current.clone();

        Ok(ApplyUpdateResult { previous, current })
    }
}

// Both person fields are required, so an update may replace them but never clear them
fn required_field(
    field: &str,
    update: &UpdateStatement,
    existing: String,
) -> Result<String, ApplyErrors> {
    match update {
        UpdateStatement::Set(value) if value.is_empty() => Err(
            ApplyErrors::NotNullConstraintViolation(field.to_string()),
        ),
        UpdateStatement::Set(value) => Ok(value.clone()),
        UpdateStatement::NoChanges => Ok(existing),
    }
}
