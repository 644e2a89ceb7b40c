//! # gk-core
//!
//! Core types and utilities for Gatekeeper.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and the `{status, message}` wire body
//! - Result type aliases
//! - Identifier types
//! - Configuration types

pub mod config;
pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
