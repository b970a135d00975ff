use serde::{Deserialize, Serialize};

use crate::model::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum QueryMatch {
    Value(String),
    Any,
}

impl QueryMatch {
    fn matches(&self, value: &str) -> bool {
        match self {
            QueryMatch::Value(expected) => expected == value,
            QueryMatch::Any => true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QueryPersonData {
    pub name: QueryMatch,
    pub number: QueryMatch,
}

impl QueryPersonData {
    /// Exact, case-sensitive match on name
    pub fn by_name(name: &str) -> Self {
        QueryPersonData {
            name: QueryMatch::Value(name.to_string()),
            number: QueryMatch::Any,
        }
    }
}

#[tracing::instrument(skip(people))]
pub fn filter(people: Vec<Person>, query: QueryPersonData) -> Vec<Person> {
    people
        .into_iter()
        .filter(|person| query.name.matches(&person.name) && query.number.matches(&person.number))
        .collect()
}
