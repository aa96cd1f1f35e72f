//! CLI command implementations.

pub mod cart;
pub mod products;

use storefront::config::{ConfigError, StorefrontConfig};
use storefront::services::{Catalog, CatalogError};
use storefront::storage::StorageError;
use storefront_core::ParseEnumError;
use thiserror::Error;

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    InvalidSort(#[from] ParseEnumError),
}

/// Load the configured catalog, or an empty one when none is configured.
///
/// # Errors
///
/// Returns `CommandError::Catalog` if the catalog file is unreadable.
pub fn load_catalog(config: &StorefrontConfig) -> Result<Catalog, CommandError> {
    let catalog = Catalog::load_optional(config.catalog_path.as_deref())?;
    if catalog.is_empty() {
        tracing::warn!("Catalog is empty; set STOREFRONT_CATALOG_PATH to a product list");
    }
    Ok(catalog)
}
