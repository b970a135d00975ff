use async_trait::async_trait;
use database::{
    consts::consts::{EntityId, EntityIdError},
    database::{
        commands::StatementError,
        request_manager::{RequestManager, RequestManagerError},
        table::{
            query::QueryPersonData,
            row::{UpdatePersonData, UpdateStatement},
            table::ApplyErrors,
        },
    },
    model::person::Person,
};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("malformatted id: {0}")]
    MalformedId(String),

    #[error("name must be unique")]
    DuplicateName(String),

    /// A field failed the store's own validation
    #[error("Validation failed: {0} is missing")]
    MissingField(String),

    #[error(transparent)]
    Database(RequestManagerError),
}

impl From<EntityIdError> for StoreError {
    fn from(err: EntityIdError) -> Self {
        match err {
            EntityIdError::Malformed(id) => StoreError::MalformedId(id),
        }
    }
}

impl From<RequestManagerError> for StoreError {
    fn from(err: RequestManagerError) -> Self {
        match err {
            RequestManagerError::Statement(StatementError::Rejected(
                ApplyErrors::UniqueConstraintViolation(name),
            )) => StoreError::DuplicateName(name),
            RequestManagerError::Statement(StatementError::Rejected(
                ApplyErrors::NotNullConstraintViolation(field),
            )) => StoreError::MissingField(field),
            other => StoreError::Database(other),
        }
    }
}

/// A person that has not been stored yet, the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub name: String,
    pub number: String,
}

/// Replacement values for a stored person, `None` leaves the field unchanged
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonFields {
    pub name: Option<String>,
    pub number: Option<String>,
}

/// Persistence collaborator of the phonebook. Identifiers are passed through as
/// received, the store decides whether they are well formed.
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Person>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Vec<Person>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Person>>;
    async fn create(&self, person: NewPerson) -> StoreResult<Person>;
    /// Returns `None` when no person has the id
    async fn update_by_id(&self, id: &str, fields: PersonFields) -> StoreResult<Option<Person>>;
    /// Returns the removed person, `None` when there was nothing to remove
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Person>>;
    async fn count(&self) -> StoreResult<usize>;
}

#[async_trait]
impl PersonStore for RequestManager {
    async fn find_all(&self) -> StoreResult<Vec<Person>> {
        Ok(self.send_list(None).await?)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Vec<Person>> {
        Ok(self.send_list(Some(QueryPersonData::by_name(name))).await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        Ok(self.send_get(id).await?)
    }

    async fn create(&self, person: NewPerson) -> StoreResult<Person> {
        Ok(self.send_add(Person::new(person.name, person.number)).await?)
    }

    async fn update_by_id(&self, id: &str, fields: PersonFields) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        let update = UpdatePersonData {
            name: UpdateStatement::from(fields.name),
            number: UpdateStatement::from(fields.number),
        };

        match self.send_update(id, update).await {
            Ok(person) => Ok(Some(person)),
            Err(RequestManagerError::Statement(StatementError::Rejected(
                ApplyErrors::CannotUpdateDoesNotExist(_),
            ))) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        Ok(self.send_remove(id).await?)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.send_count().await?)
    }
}
