use serde::{Deserialize, Serialize};

use crate::consts::consts::EntityId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub number: String,
}

impl Person {
    pub fn new(name: String, number: String) -> Self {
        Person {
            id: EntityId::new(),
            name,
            number,
        }
    }

    pub fn new_test() -> Self {
        Person::new("Ada Lovelace".to_string(), "39-44-5323523".to_string())
    }
}
