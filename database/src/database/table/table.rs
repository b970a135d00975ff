use std::collections::HashMap;
use thiserror::Error;

use crate::{
    consts::consts::{EntityId, TransactionId},
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::{
    query::{filter, QueryMatch, QueryPersonData},
    row::{ApplyUpdateResult, PersonRow, RollbackAction, UpdatePersonData},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    // CRUD - UPDATE
    #[error("Cannot update, record does not exist: {0}")]
    CannotUpdateDoesNotExist(EntityId),

    // Constraints
    #[error("Cannot save row as a person already exists with this name: {0}")]
    UniqueConstraintViolation(String),

    #[error("Cannot set field to an empty value: {0}")]
    NotNullConstraintViolation(String),
}

/// Outcome of applying a statement. Mutations also return how to undo them.
#[derive(Debug)]
pub struct AppliedStatement {
    pub result: StatementResult,
    pub rollback: Option<RollbackAction>,
}

impl AppliedStatement {
    fn query(result: StatementResult) -> Self {
        Self {
            result,
            rollback: None,
        }
    }

    fn mutation(result: StatementResult, rollback: RollbackAction) -> Self {
        Self {
            result,
            rollback: Some(rollback),
        }
    }
}

#[derive(Default)]
pub struct PersonTable {
    pub person_rows: HashMap<EntityId, PersonRow>,
    pub unique_name_index: HashMap<String, EntityId>,
}

impl PersonTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.person_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.person_rows.is_empty()
    }

    // Each mutation statement can be broken up into 3 steps
    //  - Verifying validity / constraints (uniqueness, not null)
    //  - Applying statement
    //  - Maintaining the name index
    #[tracing::instrument(skip(self))]
    pub fn apply(
        &mut self,
        statement: Statement,
        transaction_id: &TransactionId,
    ) -> Result<AppliedStatement, ApplyErrors> {
        let applied = match statement {
            Statement::Add(person) => self.apply_add(person, transaction_id)?,
            Statement::Update(id, update_person) => self.apply_update(id, &update_person)?,
            Statement::Remove(id) => self.apply_remove(&id),
            Statement::Get(id) => AppliedStatement::query(StatementResult::GetSingle(
                self.person_rows.get(&id).map(|row| row.person.clone()),
            )),
            // Exact name lookups are answered by the unique name index
            Statement::List(Some(QueryPersonData {
                name: QueryMatch::Value(name),
                number: QueryMatch::Any,
            })) => AppliedStatement::query(StatementResult::List(
                self.unique_name_index
                    .get(&name)
                    .and_then(|id| self.person_rows.get(id))
                    .map(|row| row.person.clone())
                    .into_iter()
                    .collect(),
            )),
            Statement::List(query) => {
                let people = self.list_in_insertion_order();

                let people = match query {
                    Some(query) => filter(people, query),
                    None => people,
                };

                AppliedStatement::query(StatementResult::List(people))
            }
            Statement::Count => AppliedStatement::query(StatementResult::Count(self.len())),
        };

        Ok(applied)
    }

    fn apply_add(
        &mut self,
        person: Person,
        transaction_id: &TransactionId,
    ) -> Result<AppliedStatement, ApplyErrors> {
        if person.name.is_empty() {
            return Err(ApplyErrors::NotNullConstraintViolation("name".to_string()));
        }

        if person.number.is_empty() {
            return Err(ApplyErrors::NotNullConstraintViolation(
                "number".to_string(),
            ));
        }

        if self.person_rows.contains_key(&person.id) {
            return Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id));
        }

        if self.unique_name_index.contains_key(&person.name) {
            return Err(ApplyErrors::UniqueConstraintViolation(person.name));
        }

        let id = person.id.clone();

        self.unique_name_index
            .insert(person.name.clone(), id.clone());

        self.person_rows.insert(
            id.clone(),
            PersonRow::new(person.clone(), transaction_id.clone()),
        );

        Ok(AppliedStatement::mutation(
            StatementResult::Single(person),
            RollbackAction::DropRow(id),
        ))
    }

    fn apply_update(
        &mut self,
        id: EntityId,
        update_person: &UpdatePersonData,
    ) -> Result<AppliedStatement, ApplyErrors> {
        let person_row = self
            .person_rows
            .get_mut(&id)
            .ok_or(ApplyErrors::CannotUpdateDoesNotExist(id.clone()))?;

        let previous_row = person_row.clone();

        let ApplyUpdateResult { current, previous } = person_row.apply_update(update_person)?;

        // Renaming a person to their own name does not collide with the index
        if current.name != previous.name {
            if self.unique_name_index.contains_key(&current.name) {
                // Undo the row change, the name belongs to someone else
                self.person_rows.insert(id, previous_row);

                return Err(ApplyErrors::UniqueConstraintViolation(current.name));
            }

            self.unique_name_index.remove(&previous.name);
            self.unique_name_index
                .insert(current.name.clone(), id.clone());
        }

        Ok(AppliedStatement::mutation(
            StatementResult::Single(current),
            RollbackAction::RestoreRow(previous_row),
        ))
    }

    fn apply_remove(&mut self, id: &EntityId) -> AppliedStatement {
        match self.person_rows.remove(id) {
            Some(previous_row) => {
                self.unique_name_index.remove(&previous_row.person.name);

                AppliedStatement::mutation(
                    StatementResult::GetSingle(Some(previous_row.person.clone())),
                    RollbackAction::RestoreRow(previous_row),
                )
            }
            None => AppliedStatement::query(StatementResult::GetSingle(None)),
        }
    }

    pub fn apply_rollback(&mut self, rollback: RollbackAction) {
        match rollback {
            RollbackAction::DropRow(id) => {
                if let Some(row) = self.person_rows.remove(&id) {
                    self.unique_name_index.remove(&row.person.name);
                }
            }
            RollbackAction::RestoreRow(previous_row) => {
                let id = previous_row.person.id.clone();

                if let Some(current_row) = self.person_rows.remove(&id) {
                    self.unique_name_index.remove(&current_row.person.name);
                }

                self.unique_name_index
                    .insert(previous_row.person.name.clone(), id.clone());
                self.person_rows.insert(id, previous_row);
            }
        }
    }

    fn list_in_insertion_order(&self) -> Vec<Person> {
        let mut rows: Vec<&PersonRow> = self.person_rows.values().collect();

        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        rows.into_iter().map(|row| row.person.clone()).collect()
    }
}
