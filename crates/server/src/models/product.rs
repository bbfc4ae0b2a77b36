//! Catalog product types and request validation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use tiendita_core::{Price, PriceError, ProductId};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// Maximum product name length in characters.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum category length in characters.
pub const MAX_CATEGORY_LENGTH: usize = 60;

/// A catalog product (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Lowercase category.
    #[serde(rename = "categoria")]
    pub category: String,
    /// Unit price.
    #[serde(rename = "precio")]
    pub price: Price,
    /// Image URL, empty when absent.
    #[serde(rename = "imagen")]
    pub image: String,
    /// Free-form description, empty when absent.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// When the product was created.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Validation failures for product payloads.
///
/// The `Display` text is the message returned to API clients.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductInputError {
    /// Creation without a name or without a price.
    #[error("Faltan nombre o precio")]
    MissingNameOrPrice,

    /// Price is not a number or is out of range.
    #[error("Precio inválido")]
    InvalidPrice(#[source] PriceError),

    /// Name exceeds [`MAX_NAME_LENGTH`].
    #[error("El nombre admite como máximo {max} caracteres")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// Category exceeds [`MAX_CATEGORY_LENGTH`].
    #[error("La categoría admite como máximo {max} caracteres")]
    CategoryTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub image: String,
    pub description: String,
}

impl NewProduct {
    /// Validate a creation payload.
    ///
    /// `nombre` must be a non-blank string and `precio` must be present and
    /// not `null`; `categoria` falls back to [`DEFAULT_CATEGORY`].
    ///
    /// # Errors
    ///
    /// Returns `MissingNameOrPrice` before any price parsing, then
    /// `InvalidPrice` or a length error.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ProductInputError> {
        let name = str_field(body, "nombre").map(str::trim).unwrap_or_default();
        let price = body.get("precio").filter(|v| !v.is_null());

        let Some(price) = price.filter(|_| !name.is_empty()) else {
            return Err(ProductInputError::MissingNameOrPrice);
        };
        let price = Price::from_json(price).map_err(ProductInputError::InvalidPrice)?;

        let category = str_field(body, "categoria")
            .map(normalize_category)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

        Ok(Self {
            name: check_name(name)?,
            category: check_category(category)?,
            price,
            image: body.get("imagen").map(text_value).unwrap_or_default(),
            description: body.get("descripcion").map(text_value).unwrap_or_default(),
        })
    }
}

/// A validated partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ProductChanges {
    /// Validate an update payload (PUT and PATCH share these rules).
    ///
    /// Blank `nombre` or `categoria` values are ignored. A present `precio`
    /// must parse, `null` included. `imagen` and `descripcion` are applied
    /// whenever present, `null` clearing them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrice` or a length error; nothing is applied then.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ProductInputError> {
        let name = str_field(body, "nombre")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(check_name)
            .transpose()?;

        let category = str_field(body, "categoria")
            .map(normalize_category)
            .filter(|c| !c.is_empty())
            .map(check_category)
            .transpose()?;

        let price = body
            .get("precio")
            .map(Price::from_json)
            .transpose()
            .map_err(ProductInputError::InvalidPrice)?;

        Ok(Self {
            name,
            category,
            price,
            image: body.get("imagen").map(text_value),
            description: body.get("descripcion").map(text_value),
        })
    }
}

/// Lowercase and trim a category.
#[must_use]
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

fn str_field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Free-text columns: `null` is empty, strings are kept, anything else is
/// stored as its JSON text.
fn text_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_name(name: &str) -> Result<String, ProductInputError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ProductInputError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name.to_owned())
}

fn check_category(category: String) -> Result<String, ProductInputError> {
    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(ProductInputError::CategoryTooLong {
            max: MAX_CATEGORY_LENGTH,
        });
    }
    Ok(category)
}
