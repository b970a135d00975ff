use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to initialize persistence at {0}: {1}")]
    UnableToInitializePersistence(PathBuf, io::Error),

    #[error("Unable to write transaction: {0}")]
    UnableToWriteTransaction(io::Error),

    #[error("Unable to serialize transaction: {0}")]
    UnableToSerializeTransaction(serde_json::Error),

    #[error("Unable to sync transaction buffer to persistent storage: {0}")]
    UnableToSyncTransactionBufferToPersistentStorage(io::Error),

    #[error("Unable to load previous transactions: {0}")]
    UnableToLoadPreviousTransactions(io::Error),

    #[error("Corrupt transaction on line {0}: {1}")]
    CorruptTransaction(usize, serde_json::Error),
}

const TRANSACTION_LOG_FILE: &str = "transaction_log.json";

/// File backed storage for the transaction log, lives under the data directory
pub struct FileStorage {
    log_file: File,
    transaction_file_path: PathBuf,
}

impl FileStorage {
    // Called on DB start-up, creating the directory and log are idempotent
    pub fn new(base_path: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(base_path).map_err(|e| {
            StorageError::UnableToInitializePersistence(base_path.to_path_buf(), e)
        })?;

        let transaction_file_path = base_path.join(TRANSACTION_LOG_FILE);

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&transaction_file_path)
            .map_err(|e| {
                StorageError::UnableToInitializePersistence(transaction_file_path.clone(), e)
            })?;

        Ok(Self {
            log_file,
            transaction_file_path,
        })
    }

    pub fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        // Buffered OS write, is not 'durable' without the fsync
        self.log_file
            .write_all(transaction)
            .map_err(StorageError::UnableToWriteTransaction)
    }

    pub fn transaction_sync(&self) -> StorageResult<()> {
        self.log_file
            .sync_all()
            .map_err(StorageError::UnableToSyncTransactionBufferToPersistentStorage)
    }

    pub fn transaction_load(&self) -> StorageResult<String> {
        let mut contents = String::new();

        File::open(&self.transaction_file_path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(StorageError::UnableToLoadPreviousTransactions)?;

        Ok(contents)
    }
}
