//! Storefront Core - Shared types library.
//!
//! This crate provides the types used across all storefront components:
//! - `storefront` - Cart store, persistence adapters, and HTTP surface
//! - `cli` - Command-line tools for inspecting and editing the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP. The cart reducer lives here so it can be exercised without
//! any persistence adapter attached.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, and product snapshots
//! - [`cart`] - Cart line items, the cart reducer, and the totals calculator
//! - [`catalog`] - Product filtering, sorting, and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartAction, CartItem, CartTotals, calculate_totals};
pub use catalog::{PaginationInfo, ProductFilters, ProductPage, SortBy};
pub use types::*;
