//! Payment methods and the simulated payment gateway.
//!
//! There is no real processor behind `/api/pagos`: each payment is approved
//! with a fixed probability and the outcome is recorded as a transaction
//! either way.

use rand::Rng;
use sqlx::SqlitePool;
use thiserror::Error;

use tiendita_core::{
    PaymentMethodId, PaymentMethodKind, Price, PriceError, TransactionId, TransactionStatus, UserId,
};

use crate::db::{PaymentRepository, RepositoryError, UserRepository};
use crate::models::payment::{NewPaymentMethod, NewTransaction, PaymentMethod, Transaction};

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The referenced user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The referenced payment method does not exist (or is already deleted).
    #[error("payment method not found")]
    MethodNotFound,

    /// The method belongs to another user or has been deactivated.
    #[error("payment method not usable for this user")]
    MethodNotUsable,

    /// The transaction does not exist.
    #[error("transaction not found")]
    TransactionNotFound,

    /// Unknown payment method kind.
    #[error("invalid payment method kind: {0}")]
    InvalidKind(String),

    /// Alias missing or blank.
    #[error("alias is required")]
    MissingAlias,

    /// `last4` is not four digits, or missing for a card.
    #[error("last4 must be exactly four digits")]
    InvalidLast4,

    /// Amount is not a positive number in range.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] PriceError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Randomized payment gateway.
///
/// ```
/// use tiendita_core::TransactionStatus;
/// use tiendita_server::services::payments::PaymentSimulator;
///
/// assert_eq!(PaymentSimulator::new(1.0).decide(), TransactionStatus::Aprobada);
/// assert_eq!(PaymentSimulator::new(0.0).decide(), TransactionStatus::Rechazada);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSimulator {
    approval_rate: f64,
}

impl PaymentSimulator {
    /// Create a simulator approving with probability `approval_rate`.
    ///
    /// Values outside `[0, 1]` are clamped; `NaN` rejects everything.
    #[must_use]
    pub fn new(approval_rate: f64) -> Self {
        let approval_rate = if approval_rate.is_nan() {
            0.0
        } else {
            approval_rate.clamp(0.0, 1.0)
        };
        Self { approval_rate }
    }

    /// Probability that a payment is approved.
    #[must_use]
    pub const fn approval_rate(&self) -> f64 {
        self.approval_rate
    }

    /// Decide the outcome of one payment using the thread-local RNG.
    #[must_use]
    pub fn decide(&self) -> TransactionStatus {
        self.decide_with(&mut rand::rng())
    }

    /// Decide the outcome of one payment with a caller-supplied RNG.
    pub fn decide_with<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionStatus {
        if rng.random_bool(self.approval_rate) {
            TransactionStatus::Aprobada
        } else {
            TransactionStatus::Rechazada
        }
    }
}

/// Raw payment-method input, before validation.
#[derive(Debug, Clone, Copy)]
pub struct MethodInput<'r> {
    pub kind: &'r str,
    pub alias: &'r str,
    pub last4: Option<&'r str>,
}

/// Payment service.
pub struct PaymentService<'a> {
    payments: PaymentRepository<'a>,
    users: UserRepository<'a>,
    simulator: &'a PaymentSimulator,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, simulator: &'a PaymentSimulator) -> Self {
        Self {
            payments: PaymentRepository::new(pool),
            users: UserRepository::new(pool),
            simulator,
        }
    }

    /// Register a payment method for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::UserNotFound` if the user doesn't exist, or a
    /// validation error for the kind, alias or last four digits.
    pub async fn add_method(
        &self,
        user_id: UserId,
        input: MethodInput<'_>,
    ) -> Result<PaymentMethod, PaymentError> {
        let kind = input
            .kind
            .parse::<PaymentMethodKind>()
            .map_err(|_| PaymentError::InvalidKind(input.kind.to_owned()))?;

        let alias = input.alias.trim();
        if alias.is_empty() {
            return Err(PaymentError::MissingAlias);
        }

        let last4 = validate_last4(kind, input.last4)?;

        self.require_user(user_id).await?;

        let method = self
            .payments
            .create_method(&NewPaymentMethod {
                user_id,
                kind,
                alias: alias.to_owned(),
                last4,
            })
            .await?;

        tracing::info!(user_id = %user_id, method_id = %method.id, kind = %kind, "Payment method added");

        Ok(method)
    }

    /// List a user's active payment methods.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::UserNotFound` if the user doesn't exist.
    pub async fn list_methods(&self, user_id: UserId) -> Result<Vec<PaymentMethod>, PaymentError> {
        self.require_user(user_id).await?;
        Ok(self.payments.list_active_methods(user_id).await?)
    }

    /// Deactivate a payment method.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MethodNotFound` if no active method has this ID.
    pub async fn remove_method(&self, method_id: PaymentMethodId) -> Result<(), PaymentError> {
        if self.payments.deactivate_method(method_id).await? {
            Ok(())
        } else {
            Err(PaymentError::MethodNotFound)
        }
    }

    /// Run a payment through the simulator and record the result.
    ///
    /// A rejected payment is not an error: the returned transaction carries
    /// [`TransactionStatus::Rechazada`].
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for a zero amount,
    /// `PaymentError::UserNotFound` / `PaymentError::MethodNotFound` for
    /// unknown references and `PaymentError::MethodNotUsable` when the method
    /// is inactive or owned by someone else.
    pub async fn process(
        &self,
        user_id: UserId,
        method_id: PaymentMethodId,
        amount: Price,
        concept: &str,
    ) -> Result<Transaction, PaymentError> {
        let amount = amount.require_positive()?;

        self.require_user(user_id).await?;

        let method = self
            .payments
            .get_method(method_id)
            .await?
            .ok_or(PaymentError::MethodNotFound)?;
        if method.user_id != user_id || !method.active {
            return Err(PaymentError::MethodNotUsable);
        }

        let status = self.simulator.decide();

        let transaction = self
            .payments
            .create_transaction(&NewTransaction {
                user_id,
                payment_method_id: method_id,
                amount,
                concept: concept.trim().to_owned(),
                status,
            })
            .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            user_id = %user_id,
            amount = %amount,
            status = %status,
            "Payment processed"
        );

        Ok(transaction)
    }

    /// List a user's transactions.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::UserNotFound` if the user doesn't exist.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, PaymentError> {
        self.require_user(user_id).await?;
        Ok(self.payments.list_transactions(user_id).await?)
    }

    /// Get a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::TransactionNotFound` if it doesn't exist.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, PaymentError> {
        self.payments
            .get_transaction(id)
            .await?
            .ok_or(PaymentError::TransactionNotFound)
    }

    async fn require_user(&self, user_id: UserId) -> Result<(), PaymentError> {
        match self.users.get_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(PaymentError::UserNotFound),
        }
    }
}

/// Blank `last4` counts as absent; cards must carry one.
fn validate_last4(
    kind: PaymentMethodKind,
    last4: Option<&str>,
) -> Result<Option<String>, PaymentError> {
    match last4.map(str::trim).filter(|s| !s.is_empty()) {
        Some(digits) if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(Some(digits.to_owned()))
        }
        Some(_) => Err(PaymentError::InvalidLast4),
        None if kind.requires_last4() => Err(PaymentError::InvalidLast4),
        None => Ok(None),
    }
}
