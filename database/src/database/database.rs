use std::{thread, time::Instant};

use flume::Receiver;
use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use crate::{
    consts::consts::TransactionId,
    model::statement::{Statement, StatementResult},
    persistence::{
        storage::StorageError,
        transaction::{Transaction, TransactionWAL},
    },
};

use super::{
    commands::{DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse, StatementError},
    options::DatabaseOptions,
    request_manager::RequestManager,
    table::table::{AppliedStatement, PersonTable},
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Unable to replay transaction {0} from the transaction log: {1}")]
    Restore(TransactionId, StatementError),

    #[error("Unable to start database thread: {0}")]
    UnableToSpawn(std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ApplyMode {
    /// Statement came from a caller, mutations must be written to the transaction log
    Request,
    /// Statement is being replayed from the transaction log
    Restore,
}

pub struct Database {
    pub(crate) person_table: PersonTable,
    transaction_wal: TransactionWAL,
    database_options: DatabaseOptions,
}

impl Database {
    /// Opens the transaction log and, when enabled, replays it into the table
    pub fn new(options: DatabaseOptions) -> Result<Self, DatabaseError> {
        let transaction_wal = TransactionWAL::new(&options)?;

        let mut database = Self {
            person_table: PersonTable::new(),
            transaction_wal,
            database_options: options,
        };

        if database.database_options.restore {
            database.restore()?;
        }

        Ok(database)
    }

    fn restore(&mut self) -> Result<(), DatabaseError> {
        log::info!(
            "Transaction Log Location: [{}]",
            self.database_options.data_directory.display()
        );

        let now = Instant::now();

        let restored_transactions = self.transaction_wal.restore()?;
        let restored_transaction_count = restored_transactions.len();

        for Transaction { id, statement } in restored_transactions {
            self.apply_statement(statement, id.clone(), ApplyMode::Restore)
                .map_err(|e| DatabaseError::Restore(id, e))?;
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [Rows: {}, TransactionsApplied: {}, CurrentTxId: {}]",
            self.person_table.len().to_formatted_string(&Locale::en),
            restored_transaction_count.to_formatted_string(&Locale::en),
            self.transaction_wal
                .get_current_transaction_id()
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(())
    }

    /// Starts the database thread, the returned request manager is the only way to talk to it
    pub fn run(self) -> Result<RequestManager, DatabaseError> {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseCommandRequest>();

        let request_timeout = self.database_options.request_timeout;

        thread::Builder::new()
            .name("Database".to_string())
            .spawn(move || self.process_commands(database_receiver))
            .map_err(DatabaseError::UnableToSpawn)?;

        Ok(RequestManager::new(database_sender, request_timeout))
    }

    // Runs until a shutdown command arrives or every request manager has been dropped
    fn process_commands(mut self, database_receiver: Receiver<DatabaseCommandRequest>) {
        while let Ok(DatabaseCommandRequest { resolver, command }) = database_receiver.recv() {
            log::debug!("Received request: {}", command.log_format());

            let response = match command {
                DatabaseCommand::Statement(statement) => {
                    DatabaseCommandResponse::Statement(self.process_statement(statement))
                }
                DatabaseCommand::Shutdown => {
                    log::info!(
                        "Shutting down database [WALSize: {}]",
                        self.transaction_wal.get_wal_size()
                    );

                    // Requests queued behind the shutdown are dropped, their callers see the
                    //  database as stopped instead of waiting out their timeout
                    let dropped_requests = database_receiver.drain().count();
                    drop(database_receiver);

                    if dropped_requests > 0 {
                        log::warn!("Dropped {} requests queued after shutdown", dropped_requests);
                    }

                    let _ = resolver.send(DatabaseCommandResponse::Shutdown(
                        "Successfully shutdown database".to_string(),
                    ));

                    return;
                }
            };

            // The caller may have timed out and dropped its receiver, which is fine
            let _ = resolver.send(response);
        }
    }

    pub fn process_statement(
        &mut self,
        statement: Statement,
    ) -> Result<StatementResult, StatementError> {
        let applying_transaction_id = self
            .transaction_wal
            .get_current_transaction_id()
            .increment();

        self.apply_statement(statement, applying_transaction_id, ApplyMode::Request)
    }

    fn apply_statement(
        &mut self,
        statement: Statement,
        transaction_id: TransactionId,
        mode: ApplyMode,
    ) -> Result<StatementResult, StatementError> {
        if statement.is_query() {
            let AppliedStatement { result, .. } =
                self.person_table.apply(statement, &transaction_id)?;

            return Ok(result);
        }

        let AppliedStatement { result, rollback } = self
            .person_table
            .apply(statement.clone(), &transaction_id)?;

        // Nothing changed (e.g. removing a missing row), there is nothing to persist
        let Some(rollback) = rollback else {
            return Ok(result);
        };

        match mode {
            ApplyMode::Restore => self
                .transaction_wal
                .set_current_transaction_id(transaction_id),
            ApplyMode::Request => {
                if let Err(err) = self
                    .transaction_wal
                    .commit(transaction_id.clone(), &statement)
                {
                    log::error!("⚠️  Rolled back: [TX: {}] {}", &transaction_id, err);

                    self.person_table.apply_rollback(rollback);

                    return Err(StatementError::RolledBack(err.to_string()));
                }

                log::info!("✅ Committed: [TX: {}]", &transaction_id);
            }
        }

        Ok(result)
    }
}
