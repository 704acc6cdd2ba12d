// Rental Catalog - Core Library
// Exposes the entity model, storage engines and (with `server`) the REST API

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{StorageBackend, StorageConfig};
pub use error::{Result, StorageError};
pub use models::{
    Amenity, Attributes, City, Entity, FieldError, Kind, Model, Place, Review, State, User,
};
pub use storage::{DbStorage, FileStorage, Storage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
