use thiserror::Error;

use crate::model::statement::{Statement, StatementResult};

use super::table::table::ApplyErrors;

/// Database commands are how we interact with the database thread
///
/// The majority of interactions happen via statements (e.g. add, update, remove, etc), the
/// remaining command controls the thread itself.
#[derive(Debug)]
pub enum DatabaseCommand {
    /// Applies a single statement and returns its result
    Statement(Statement),

    /// Performs a safe shutdown of the database, requests before the shutdown will be run / committed,
    /// requests after the shutdown will be ignored
    Shutdown,
}

impl DatabaseCommand {
    /// Prints complex logs in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseCommand::Statement(Statement::Add(person)) => {
                format!("Add [id: {}, name: {}]", person.id, person.name)
            }
            DatabaseCommand::Statement(statement) => format!("{:?}", statement),
            DatabaseCommand::Shutdown => "Shutdown".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatementError {
    /// The table refused the statement, nothing was changed
    #[error(transparent)]
    Rejected(#[from] ApplyErrors),

    /// The statement was applied but could not be persisted, so it was undone
    #[error("Rolled back, unable to persist transaction: {0}")]
    RolledBack(String),
}

#[derive(Debug, PartialEq)]
pub enum DatabaseCommandResponse {
    Statement(Result<StatementResult, StatementError>),
    /// Successfully shut down, returns a status message
    Shutdown(String),
}

pub struct DatabaseCommandRequest {
    pub resolver: oneshot::Sender<DatabaseCommandResponse>,
    pub command: DatabaseCommand,
}
