//! Storefront library.
//!
//! This crate provides the cart store, its persistence adapters, and the
//! HTTP surface as a library, allowing them to be tested and reused by the
//! CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
