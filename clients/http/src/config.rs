use std::time::Duration;

use clap::{Parser, ValueEnum};
use database::{
    database::options::DatabaseOptions,
    persistence::transaction::{TransactionFileWriteMode, TransactionWriteMode},
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum WalMode {
    /// fsync the transaction log on every commit
    Sync,
    /// Let the OS buffer transaction log writes
    Buffered,
}

/// 📇 Phonebook Server, a REST interface for creating, listing, updating and deleting phonebook entries
#[derive(Parser, Debug)]
pub struct Cli {
    /// Location of the database. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, env = "PHONEBOOK_DATA", default_value = "data")]
    pub data: std::path::PathBuf,

    /// Port the http server will run on
    #[clap(short, long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Address the http server will run on
    #[clap(short, long, env = "PHONEBOOK_ADDRESS", default_value = "0.0.0.0")]
    pub address: String,

    /// Logs every http request
    #[clap(long, env = "PHONEBOOK_LOG_HTTP")]
    pub log_http: bool,

    #[clap(long, env = "PHONEBOOK_HTTP_WORKERS", default_value_t = 2)]
    pub http_workers: usize,

    /// How the transaction log is written
    #[clap(long, env = "PHONEBOOK_WAL_MODE", value_enum, default_value_t = WalMode::Sync)]
    pub wal_mode: WalMode,

    /// How long a request waits on the database before failing, in milliseconds
    #[clap(long, env = "PHONEBOOK_REQUEST_TIMEOUT_MS", default_value_t = 2000)]
    pub request_timeout_ms: u64,

    /// Keep everything in memory, nothing is restored or persisted
    #[clap(long, env = "PHONEBOOK_IN_MEMORY")]
    pub in_memory: bool,
}

impl Cli {
    pub fn database_options(&self) -> DatabaseOptions {
        let options = DatabaseOptions::default()
            .set_data_directory(self.data.clone())
            .set_request_timeout(Duration::from_millis(self.request_timeout_ms));

        if self.in_memory {
            return options.in_memory();
        }

        let write_mode = match self.wal_mode {
            WalMode::Sync => TransactionWriteMode::File(TransactionFileWriteMode::Sync),
            WalMode::Buffered => TransactionWriteMode::File(TransactionFileWriteMode::OSBuffered),
        };

        options.set_write_mode(write_mode)
    }
}
