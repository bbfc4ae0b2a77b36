//! Seed the catalog from a YAML file.
//!
//! The file is a list of products using the same field names as the JSON
//! API:
//!
//! ```yaml
//! - nombre: Taza de barro
//!   precio: 149.90
//!   categoria: cocina
//!   imagen: taza.jpg
//!   descripcion: Hecha a mano
//! - nombre: Vela aromática
//!   precio: "35"
//! ```
//!
//! Every entry is validated before anything is written.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use tiendita_server::db::{self, ProductRepository, RepositoryError};
use tiendita_server::models::{NewProduct, ProductInputError};

use super::ConnectError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Expected a list of products")]
    NotAList,

    #[error("Product #{index}: {reason}")]
    InvalidProduct { index: usize, reason: String },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parse and validate a product list. Indexes in errors are 1-based.
///
/// # Errors
///
/// Returns `SeedError` for malformed YAML or the first invalid product.
pub fn parse_products(content: &str) -> Result<Vec<NewProduct>, SeedError> {
    let value: Value = serde_yaml::from_str(content)?;
    let Value::Array(entries) = value else {
        return Err(SeedError::NotAList);
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let index = i + 1;
            let Value::Object(fields) = entry else {
                return Err(SeedError::InvalidProduct {
                    index,
                    reason: "not a mapping".to_owned(),
                });
            };
            NewProduct::from_json(fields).map_err(|e: ProductInputError| {
                SeedError::InvalidProduct {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

/// Insert the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or the database
/// cannot be written.
pub async fn products(file_path: &str) -> Result<usize, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    tracing::info!(path = %file_path, "Loading products from file");

    // Validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_products(&content)?;

    tracing::info!(products = products.len(), "Parsed products");

    let (_, pool) = super::connect().await?;
    db::run_migrations(&pool).await?;

    let repo = ProductRepository::new(&pool);
    for product in &products {
        let created = repo.create(product).await?;
        tracing::debug!(product_id = %created.id, name = %created.name, "Inserted product");
    }

    let total = repo.count().await?;
    tracing::info!(
        "Seeding complete! Products inserted: {}, catalog size: {total}",
        products.len()
    );
    Ok(products.len())
}
