//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{CartStorageConfig, StorefrontConfig};
use crate::error::AppError;
use crate::services::{CartStore, Catalog};
use crate::storage::{FileStorage, KeyValueStore, StorageError};

/// Storage backend type held by the shared cart store.
pub type BoxedStorage = Box<dyn KeyValueStore + Send>;

/// The cart store as held by the application.
pub type SharedCartStore = CartStore<BoxedStorage>;

/// Open the file-backed cart store described by `config`.
///
/// The store comes back un-hydrated.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` if the configured key is unusable.
pub fn open_cart_store(config: &CartStorageConfig) -> Result<SharedCartStore, StorageError> {
    let storage: BoxedStorage = Box::new(FileStorage::new(config.storage_dir.clone()));
    CartStore::with_key(storage, config.key.clone())
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The cart store is owned here
/// and handed to handlers through [`AppState::cart`]; nothing else holds it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: Mutex<SharedCartStore>,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The cart store is taken as-is; hydrating it is the caller's job.
    #[must_use]
    pub fn new(config: StorefrontConfig, cart: SharedCartStore, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                cart: Mutex::new(cart),
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Lock the cart store.
    ///
    /// The guard must not be held across an `.await`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if a previous holder panicked.
    pub fn cart(&self) -> Result<MutexGuard<'_, SharedCartStore>, AppError> {
        self.inner
            .cart
            .lock()
            .map_err(|_| AppError::Internal("cart store lock poisoned".to_string()))
    }

    /// Lock the cart store, refusing if hydration has not finished.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotReady` before hydration completes.
    pub fn ready_cart(&self) -> Result<MutexGuard<'_, SharedCartStore>, AppError> {
        let store = self.cart()?;
        if store.is_ready() {
            Ok(store)
        } else {
            Err(AppError::NotReady)
        }
    }

    /// Tear down the state, returning the cart store if this was the last handle.
    #[must_use]
    pub fn into_cart_store(self) -> Option<SharedCartStore> {
        Arc::into_inner(self.inner).and_then(|inner| inner.cart.into_inner().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storefront_core::{Price, Product};
    use tempfile::tempdir;

    use super::*;
    use crate::storage::MemoryStorage;

    fn memory_store() -> SharedCartStore {
        let storage: BoxedStorage = Box::new(MemoryStorage::new());
        CartStore::new(storage)
    }

    fn state_with(store: SharedCartStore) -> AppState {
        let config = StorefrontConfig::from_lookup(|_| None).unwrap();
        AppState::new(config, store, Catalog::default())
    }

    #[test]
    fn test_ready_cart_refuses_before_hydration() {
        let state = state_with(memory_store());
        assert!(matches!(state.ready_cart(), Err(AppError::NotReady)));

        state.cart().unwrap().hydrate();
        assert!(state.ready_cart().is_ok());
    }

    #[test]
    fn test_into_cart_store_needs_last_handle() {
        let state = state_with(memory_store());
        let other = state.clone();
        assert!(state.into_cart_store().is_none());
        assert!(other.into_cart_store().is_some());
    }

    #[test]
    fn test_open_cart_store_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let config = CartStorageConfig {
            storage_dir: dir.path().to_path_buf(),
            key: "cart".to_string(),
        };

        let mut store = open_cart_store(&config).unwrap();
        store.hydrate();
        store.add(Product::new("p1", "Lamp", Price::from_cents(1000)), 2);
        drop(store);

        let mut reopened = open_cart_store(&config).unwrap();
        reopened.hydrate();
        let cart = reopened.state().ready().unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_cents(2000));
        assert!(dir.path().join("cart.json").exists());
    }

    #[test]
    fn test_open_cart_store_rejects_bad_key() {
        let config = CartStorageConfig {
            storage_dir: ".".into(),
            key: "../escape".to_string(),
        };
        assert!(matches!(
            open_cart_store(&config),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
