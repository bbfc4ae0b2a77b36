//! Payment method and transaction repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use tiendita_core::{
    PaymentMethodId, PaymentMethodKind, Price, TransactionId, TransactionStatus, UserId,
};

use super::RepositoryError;
use crate::models::payment::{NewPaymentMethod, NewTransaction, PaymentMethod, Transaction};

const METHOD_COLUMNS: &str = "id, user_id, kind, alias, last4, active, created_at";

const TRANSACTION_COLUMNS: &str =
    "id, user_id, payment_method_id, amount_cents, concept, status, created_at";

#[derive(Debug, FromRow)]
struct PaymentMethodRow {
    id: i64,
    user_id: i64,
    kind: PaymentMethodKind,
    alias: String,
    last4: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: PaymentMethodId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: row.kind,
            alias: row.alias,
            last4: row.last4,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: i64,
    user_id: i64,
    payment_method_id: i64,
    amount_cents: i64,
    concept: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let amount = Price::from_cents(row.amount_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid amount in database: {e}"))
        })?;

        Ok(Self {
            id: TransactionId::new(row.id),
            user_id: UserId::new(row.user_id),
            payment_method_id: PaymentMethodId::new(row.payment_method_id),
            amount,
            concept: row.concept,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for payment methods and transactions.
pub struct PaymentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Register a payment method for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// foreign-key violation for an unknown user).
    pub async fn create_method(
        &self,
        method: &NewPaymentMethod,
    ) -> Result<PaymentMethod, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            r"
            INSERT INTO payment_methods (user_id, kind, alias, last4, active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            RETURNING {METHOD_COLUMNS}
            "
        ))
        .bind(method.user_id)
        .bind(method.kind)
        .bind(&method.alias)
        .bind(method.last4.as_deref())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a payment method by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a user's active payment methods, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_methods(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE user_id = ? AND active = 1 ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Deactivate a payment method.
    ///
    /// # Returns
    ///
    /// Returns `true` if an active method was deactivated, `false` if it
    /// didn't exist or was already inactive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate_method(&self, id: PaymentMethodId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE payment_methods SET active = 0 WHERE id = ? AND active = 1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Record a processed payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_transaction(
        &self,
        tx: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            INSERT INTO transactions (user_id, payment_method_id, amount_cents, concept, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(tx.user_id)
        .bind(tx.payment_method_id)
        .bind(tx.amount.to_cents())
        .bind(&tx.concept)
        .bind(tx.status)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Transaction::try_from(row)
    }

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    /// List a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ? ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
