use serde::{Deserialize, Serialize};

use crate::consts::consts::TransactionId;
use crate::database::options::DatabaseOptions;
use crate::model::statement::Statement;

use super::storage::{FileStorage, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionFileWriteMode {
    /// Writes the file to disk and performs an fsync per commit
    Sync,
    /// Writes the file to disk, lets the OS buffer the writes
    OSBuffered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWriteMode {
    /// Writes the WAL to disk
    File(TransactionFileWriteMode),
    /// Skips writing the WAL, the database only lives in memory
    Off,
}

/// One committed mutation, stored as a single JSON line in the log
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub statement: Statement,
}

// Borrowed form of `Transaction`, avoids cloning the statement on every commit
#[derive(Serialize)]
struct TransactionEntry<'a> {
    id: &'a TransactionId,
    statement: &'a Statement,
}

pub struct TransactionWAL {
    storage: Option<FileStorage>,
    write_mode: TransactionWriteMode,
    current_transaction_id: TransactionId,
    size: usize,
}

impl TransactionWAL {
    pub fn new(options: &DatabaseOptions) -> StorageResult<Self> {
        let storage = match options.write_mode {
            TransactionWriteMode::File(_) => Some(FileStorage::new(&options.data_directory)?),
            TransactionWriteMode::Off => None,
        };

        Ok(Self {
            storage,
            write_mode: options.write_mode.clone(),
            current_transaction_id: TransactionId::new_first_transaction(),
            size: 0,
        })
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn set_current_transaction_id(&mut self, transaction_id: TransactionId) {
        self.current_transaction_id = transaction_id;
    }

    /// Number of transactions written since startup
    pub fn get_wal_size(&self) -> usize {
        self.size
    }

    /// Appends the statement to the log. The transaction id only advances once
    /// the write has succeeded.
    pub fn commit(
        &mut self,
        applied_transaction_id: TransactionId,
        statement: &Statement,
    ) -> StorageResult<()> {
        if let Some(storage) = self.storage.as_mut() {
            let mut transaction_json_line = serde_json::to_string(&TransactionEntry {
                id: &applied_transaction_id,
                statement,
            })
            .map_err(StorageError::UnableToSerializeTransaction)?;

            transaction_json_line.push('\n');

            storage.transaction_write(transaction_json_line.as_bytes())?;

            // Performs an fsync on the transaction log, ensuring that the transaction is durable
            // https://www.postgresql.org/docs/current/wal-reliability.html
            if self.write_mode == TransactionWriteMode::File(TransactionFileWriteMode::Sync) {
                storage.transaction_sync()?;
            }

            self.size += 1;
        }

        self.current_transaction_id = applied_transaction_id;

        Ok(())
    }

    /// Reads every committed transaction, oldest first
    pub fn restore(&self) -> StorageResult<Vec<Transaction>> {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => return Ok(vec![]),
        };

        let transactions_data = storage.transaction_load()?;

        transactions_data
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line)
                    .map_err(|e| StorageError::CorruptTransaction(index + 1, e))
            })
            .collect()
    }
}
