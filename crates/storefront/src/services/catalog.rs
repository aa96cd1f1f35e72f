//! Read-only product catalog.
//!
//! Products are loaded once from a JSON array on disk. The cart only needs
//! id lookups; listings go through the pure helpers in
//! [`storefront_core::catalog`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use storefront_core::catalog::{filter_products, paginate, sort_products};
use storefront_core::{Product, ProductFilters, ProductId, ProductPage, SortBy};
use thiserror::Error;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Errors loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate product id in catalog: {0}")]
    DuplicateId(ProductId),
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Catalog over `products`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// Load a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a product array,
    /// or contains duplicate ids.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let products: Vec<Product> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(products)
    }

    /// Load from `path` when one is configured, otherwise start empty.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::load`].
    pub fn load_optional(path: Option<&Path>) -> Result<Self, CatalogError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Filter, optionally sort, and paginate the catalog.
    #[must_use]
    pub fn query(
        &self,
        filters: &ProductFilters,
        sort_by: Option<SortBy>,
        page: usize,
        per_page: usize,
    ) -> ProductPage {
        let mut matches = filter_products(&self.products, filters);
        if let Some(sort_by) = sort_by {
            sort_products(&mut matches, sort_by);
        }
        paginate(matches, page, per_page)
    }
}
