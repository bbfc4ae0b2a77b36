//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, password login and role assignment
//! - `payments` - Payment methods and the randomized payment simulator

pub mod auth;
pub mod payments;
