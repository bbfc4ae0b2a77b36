//! Domain models for tiendita.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`]. Their `Serialize` impls produce the JSON shapes the
//! API returns (Spanish field names).

pub mod payment;
pub mod product;
pub mod session;
pub mod user;

pub use payment::{NewPaymentMethod, NewTransaction, PaymentMethod, Transaction};
pub use product::{NewProduct, Product, ProductChanges, ProductInputError};
pub use session::CurrentUser;
pub use user::{NewUser, User};
