use serde::{Deserialize, Serialize};

use crate::{
    consts::consts::EntityId,
    database::table::{query::QueryPersonData, row::UpdatePersonData},
};

use super::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    Add(Person),
    Update(EntityId, UpdatePersonData),
    /// Removing a row that does not exist is not an error
    Remove(EntityId),
    Get(EntityId),
    /// Returns a list of Person, in insertion order
    List(Option<QueryPersonData>),
    Count,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::Remove(_) | Statement::Update(_, _) => true,
            Statement::List(_) | Statement::Get(_) | Statement::Count => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    Single(Person),
    GetSingle(Option<Person>),
    List(Vec<Person>),
    Count(usize),
}

impl StatementResult {
    pub fn single(self) -> Option<Person> {
        match self {
            StatementResult::Single(p) => Some(p),
            _ => None,
        }
    }

    pub fn get_single(self) -> Option<Option<Person>> {
        match self {
            StatementResult::GetSingle(p) => Some(p),
            _ => None,
        }
    }

    pub fn list(self) -> Option<Vec<Person>> {
        match self {
            StatementResult::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn count(self) -> Option<usize> {
        match self {
            StatementResult::Count(c) => Some(c),
            _ => None,
        }
    }
}
