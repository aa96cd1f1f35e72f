//! Business logic services.

pub mod cart;
pub mod catalog;

pub use cart::{CartLifecycle, CartState, CartStore, DEFAULT_CART_KEY, HydrationOutcome};
pub use catalog::{Catalog, CatalogError};
