//! Role and status enums stored as text columns.

use serde::{Deserialize, Serialize};

/// User role.
///
/// Decides where a successful form login lands and, when the catalog is
/// locked down, who may change products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Regular customer.
    #[default]
    User,
}

impl Role {
    /// Whether this role may manage the catalog.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Outcome of a processed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// The simulated gateway accepted the charge.
    Aprobada,
    /// The simulated gateway declined the charge.
    Rechazada,
}

impl TransactionStatus {
    /// Whether the payment went through.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Aprobada)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aprobada => write!(f, "aprobada"),
            Self::Rechazada => write!(f, "rechazada"),
        }
    }
}

/// Kind of payment method a user can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Credit or debit card; requires the last four digits.
    Tarjeta,
    /// `PayPal` account.
    Paypal,
    /// Bank transfer.
    Transferencia,
}

impl PaymentMethodKind {
    /// Whether this kind must carry the last four card digits.
    #[must_use]
    pub const fn requires_last4(self) -> bool {
        matches!(self, Self::Tarjeta)
    }
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tarjeta => write!(f, "tarjeta"),
            Self::Paypal => write!(f, "paypal"),
            Self::Transferencia => write!(f, "transferencia"),
        }
    }
}

impl std::str::FromStr for PaymentMethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tarjeta" => Ok(Self::Tarjeta),
            "paypal" => Ok(Self::Paypal),
            "transferencia" => Ok(Self::Transferencia),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" user ".parse::<Role>().unwrap(), Role::User);
        assert!("super_admin".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Aprobada).unwrap(),
            "\"aprobada\""
        );
        assert_eq!(TransactionStatus::Rechazada.to_string(), "rechazada");
        assert!(TransactionStatus::Aprobada.is_approved());
        assert!(!TransactionStatus::Rechazada.is_approved());
    }

    #[test]
    fn test_payment_method_kind() {
        assert_eq!(
            "TARJETA".parse::<PaymentMethodKind>().unwrap(),
            PaymentMethodKind::Tarjeta
        );
        assert!("cheque".parse::<PaymentMethodKind>().is_err());
        assert!(PaymentMethodKind::Tarjeta.requires_last4());
        assert!(!PaymentMethodKind::Paypal.requires_last4());
        assert_eq!(
            serde_json::from_str::<PaymentMethodKind>("\"transferencia\"").unwrap(),
            PaymentMethodKind::Transferencia
        );
    }
}
