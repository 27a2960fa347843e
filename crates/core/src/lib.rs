//! Stockroom Core - Shared domain types.
//!
//! This crate provides the validated value types used across the workspace:
//! - `api` - The inventory HTTP service
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and their validation rules - no I/O, no
//! database access, no HTTP. Database encoding is opt-in via the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames, prices,
//!   quantities and stock status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
