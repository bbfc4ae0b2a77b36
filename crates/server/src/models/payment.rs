//! Payment method and transaction types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tiendita_core::{
    PaymentMethodId, PaymentMethodKind, Price, TransactionId, TransactionStatus, UserId,
};

/// A stored way of paying (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "tipo")]
    pub kind: PaymentMethodKind,
    pub alias: String,
    /// Last four card digits, only for cards.
    #[serde(rename = "ultimos4")]
    pub last4: Option<String>,
    /// Cleared when the method is deleted.
    #[serde(rename = "activo")]
    pub active: bool,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a payment method.
#[derive(Debug, Clone)]
pub struct NewPaymentMethod {
    pub user_id: UserId,
    pub kind: PaymentMethodKind,
    pub alias: String,
    pub last4: Option<String>,
}

/// A processed payment (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "metodo_id")]
    pub payment_method_id: PaymentMethodId,
    #[serde(rename = "monto")]
    pub amount: Price,
    #[serde(rename = "concepto")]
    pub concept: String,
    #[serde(rename = "estado")]
    pub status: TransactionStatus,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub payment_method_id: PaymentMethodId,
    pub amount: Price,
    pub concept: String,
    pub status: TransactionStatus,
}
