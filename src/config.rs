use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::storage::{DbStorage, FileStorage, Storage};

pub const DEFAULT_FILE_PATH: &str = "file.json";

/// File used instead of the default whenever `HBNB_ENV` is set
pub const TEST_FILE_PATH: &str = "dummy_test_file.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON document on disk
    File,
    /// SQLite database
    Db,
}

/// Storage selection shared by every binary
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct StorageConfig {
    #[arg(long = "storage", env = "HBNB_TYPE_STORAGE", value_enum, default_value = "file")]
    pub backend: StorageBackend,

    /// JSON file for the file backend [default: file.json, or dummy_test_file.json when HBNB_ENV is set]
    #[arg(long, env = "HBNB_FILE_PATH")]
    pub file_path: Option<PathBuf>,

    #[arg(long, env = "HBNB_DB_PATH", default_value = "hbnb.db")]
    pub db_path: PathBuf,
}

impl StorageConfig {
    /// JSON file path, honouring the `HBNB_ENV` test switch
    pub fn resolved_file_path(&self) -> PathBuf {
        if let Some(path) = &self.file_path {
            return path.clone();
        }

        if std::env::var_os("HBNB_ENV").is_some() {
            PathBuf::from(TEST_FILE_PATH)
        } else {
            PathBuf::from(DEFAULT_FILE_PATH)
        }
    }

    /// Build the selected backend and load what it already holds
    pub fn open(&self) -> Result<Box<dyn Storage>> {
        let mut storage: Box<dyn Storage> = match self.backend {
            StorageBackend::File => {
                let path = self.resolved_file_path();
                info!("using file storage at {:?}", path);
                Box::new(FileStorage::open(path))
            }
            StorageBackend::Db => {
                info!("using database storage at {:?}", self.db_path);
                Box::new(DbStorage::open(&self.db_path)?)
            }
        };

        storage.reload()?;
        Ok(storage)
    }
}
