use std::time::Duration;

use flume::Sender;
use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::{
    commands::{DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse, StatementError},
    table::{query::QueryPersonData, row::UpdatePersonData},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestManagerError {
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,

    #[error("Database is not running")]
    DatabaseStopped,

    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error("Unexpected response from the database, expected: {0}")]
    UnexpectedResponse(&'static str),
}

/// Goal of the request manager is to provide a simple interface for interacting with the database
///
/// Request managers are cheap to clone, every clone talks to the same database thread. The
/// CRUD methods are type safe wrappers around `send_statement`, which maps each statement to the
/// `StatementResult` variant it produces.
#[derive(Clone, Debug)]
pub struct RequestManager {
    database_sender: Sender<DatabaseCommandRequest>,
    request_timeout: Duration,
}

impl RequestManager {
    pub fn new(database_sender: Sender<DatabaseCommandRequest>, request_timeout: Duration) -> Self {
        Self {
            database_sender,
            request_timeout,
        }
    }

    pub async fn send_add(&self, person: Person) -> Result<Person, RequestManagerError> {
        self.send_statement(Statement::Add(person))
            .await?
            .single()
            .ok_or(RequestManagerError::UnexpectedResponse("Single"))
    }

    pub async fn send_update(
        &self,
        id: EntityId,
        person_update: UpdatePersonData,
    ) -> Result<Person, RequestManagerError> {
        self.send_statement(Statement::Update(id, person_update))
            .await?
            .single()
            .ok_or(RequestManagerError::UnexpectedResponse("Single"))
    }

    /// Returns the removed person, or `None` if there was nothing to remove
    pub async fn send_remove(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        self.send_statement(Statement::Remove(id))
            .await?
            .get_single()
            .ok_or(RequestManagerError::UnexpectedResponse("GetSingle"))
    }

    pub async fn send_get(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        self.send_statement(Statement::Get(id))
            .await?
            .get_single()
            .ok_or(RequestManagerError::UnexpectedResponse("GetSingle"))
    }

    pub async fn send_list(
        &self,
        query: Option<QueryPersonData>,
    ) -> Result<Vec<Person>, RequestManagerError> {
        self.send_statement(Statement::List(query))
            .await?
            .list()
            .ok_or(RequestManagerError::UnexpectedResponse("List"))
    }

    pub async fn send_count(&self) -> Result<usize, RequestManagerError> {
        self.send_statement(Statement::Count)
            .await?
            .count()
            .ok_or(RequestManagerError::UnexpectedResponse("Count"))
    }

    /// Sends a single statement to the database and waits for its result
    pub async fn send_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseCommandResponse>();

        let request = DatabaseCommandRequest {
            resolver,
            command: DatabaseCommand::Statement(statement),
        };

        // Sends the request to the database thread, the database will respond
        //  on the response_receiver once it's finished processing the request
        self.database_sender
            .send_async(request)
            .await
            .map_err(|_| RequestManagerError::DatabaseStopped)?;

        let response = tokio::time::timeout(self.request_timeout, response_receiver)
            .await
            .map_err(|_| RequestManagerError::DatabaseTimeout)?
            .map_err(|_| RequestManagerError::DatabaseStopped)?;

        match response {
            DatabaseCommandResponse::Statement(result) => Ok(result?),
            DatabaseCommandResponse::Shutdown(_) => {
                Err(RequestManagerError::UnexpectedResponse("Statement"))
            }
        }
    }

    /// Sends a shutdown request to the database and returns the database's response. Blocks the
    /// calling thread, statements queued before the shutdown are processed first.
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseCommandResponse>();

        self.database_sender
            .send(DatabaseCommandRequest {
                resolver,
                command: DatabaseCommand::Shutdown,
            })
            .map_err(|_| RequestManagerError::DatabaseStopped)?;

        match response_receiver.recv_timeout(self.request_timeout) {
            Ok(DatabaseCommandResponse::Shutdown(message)) => Ok(message),
            Ok(DatabaseCommandResponse::Statement(_)) => {
                Err(RequestManagerError::UnexpectedResponse("Shutdown"))
            }
            Err(oneshot::RecvTimeoutError::Timeout) => Err(RequestManagerError::DatabaseTimeout),
            Err(oneshot::RecvTimeoutError::Disconnected) => {
                Err(RequestManagerError::DatabaseStopped)
            }
        }
    }
}
