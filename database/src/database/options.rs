use std::{path::PathBuf, time::Duration};

use uuid::Uuid;

use crate::persistence::transaction::{TransactionFileWriteMode, TransactionWriteMode};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub data_directory: PathBuf,
    pub restore: bool,
    pub write_mode: TransactionWriteMode,
    pub request_timeout: Duration,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    /// Directory holding the transaction log. Does not support shell paths, e.g. ~
    pub fn set_data_directory(mut self, data_directory: PathBuf) -> Self {
        self.data_directory = data_directory;
        self
    }

    /// Defines whether we should replay the transaction log on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Defines whether we should sync the file write to disk before marking the
    /// transaction as committed. This is useful for durability but can be slow ~3ms per sync
    pub fn set_write_mode(mut self, write_mode: TransactionWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// How long a caller waits for the database thread before giving up
    pub fn set_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Purely in memory database, nothing is read from or written to disk
    pub fn in_memory(self) -> Self {
        self.set_restore(false)
            .set_write_mode(TransactionWriteMode::Off)
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        // Defaults to $CWD/data
        Self {
            data_directory: PathBuf::from("data"),
            restore: true,
            write_mode: TransactionWriteMode::File(TransactionFileWriteMode::Sync),
            request_timeout: Duration::from_secs(2),
        }
    }
}

impl DatabaseOptions {
    /// In memory options pointing at a unique scratch directory, so tests that
    /// switch on the transaction log never share files
    pub fn new_test() -> Self {
        let database_dir: PathBuf = ["/", "tmp", "phonebook", &Uuid::new_v4().to_string()]
            .iter()
            .collect();

        DatabaseOptions::default()
            .set_data_directory(database_dir)
            .in_memory()
    }
}
