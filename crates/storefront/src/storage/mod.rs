//! Key-value persistence adapters.
//!
//! The cart store only ever needs three operations against its durable copy,
//! so every backend implements [`KeyValueStore`]:
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota
//! - [`FileStorage`] - one JSON file per key under a directory
//!
//! Keys are restricted to `[A-Za-z0-9_-]` (1-128 chars) so they map safely to
//! file names.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Maximum key length accepted by [`validate_key`].
pub const MAX_KEY_LENGTH: usize = 128;

/// Errors returned by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key contains characters outside `[A-Za-z0-9_-]` or has a bad length.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The write would exceed the backend's quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Minimal string key-value interface for durable state.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected or fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Check that `key` is usable by every backend.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if the key is empty, longer than
/// [`MAX_KEY_LENGTH`], or contains characters outside `[A-Za-z0-9_-]`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
