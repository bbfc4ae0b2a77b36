//! Tiendita Core - Shared domain types.
//!
//! This crate provides the types shared by every Tiendita component:
//! - `server` - HTTP backend (catalog, accounts, payments)
//! - `cli` - Command-line tools for migrations, users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. The optional `sqlite` feature adds `sqlx` encode/decode
//! support so the newtypes can be bound and read directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, usernames and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
