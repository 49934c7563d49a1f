//! Settlement error types.
//!
//! Every variant is terminal for the computation that raised it: a summary is
//! either fully consistent or not produced at all.

use thiserror::Error;
use wayfare_shared::AppError;
use wayfare_shared::types::{ExpenseId, Money};

/// Errors that can occur while resolving expenses or planning settlements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    // ========== Input Errors ==========
    /// A split row is malformed or the split rules of an expense contradict
    /// each other.
    #[error("Invalid split on expense {expense_id}: {reason}")]
    InvalidSplit {
        /// Expense whose splits were rejected.
        expense_id: ExpenseId,
        /// Human-readable cause.
        reason: String,
    },

    /// Amount and percentage shares together exceed the expense amount.
    #[error("Expense {expense_id} is over-allocated: {allocated} assigned against a total of {total}")]
    OverAllocated {
        /// Over-allocated expense.
        expense_id: ExpenseId,
        /// Expense amount.
        total: Money,
        /// Sum of amount and percentage shares.
        allocated: Money,
    },

    /// Part of the expense is left over and no equal-share participant can
    /// absorb it.
    #[error("Expense {expense_id} leaves {remainder} unallocated with no equal-share participant")]
    UnallocatedRemainder {
        /// Expense with the remainder.
        expense_id: ExpenseId,
        /// Amount left over.
        remainder: Money,
    },

    /// Expense amount is zero or negative.
    #[error("Expense {expense_id} has non-positive amount {amount}")]
    NonPositiveAmount {
        /// Offending expense.
        expense_id: ExpenseId,
        /// Submitted amount.
        amount: Money,
    },

    // ========== Engine Faults ==========
    /// Member balances do not sum to zero. Indicates a bug, not bad input.
    #[error("Internal inconsistency: balances do not sum to zero (off by {imbalance})")]
    InternalInconsistency {
        /// Net sum of all balances.
        imbalance: Money,
    },
}

impl SettlementError {
    /// Builds an `InvalidSplit` error.
    pub(crate) fn invalid_split(expense_id: ExpenseId, reason: impl Into<String>) -> Self {
        Self::InvalidSplit {
            expense_id,
            reason: reason.into(),
        }
    }

    /// Returns true if the error was caused by the submitted records rather
    /// than by the engine itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::InternalInconsistency { .. })
    }

    /// Returns the expense the error refers to, if any.
    #[must_use]
    pub const fn expense_id(&self) -> Option<ExpenseId> {
        match self {
            Self::InvalidSplit { expense_id, .. }
            | Self::OverAllocated { expense_id, .. }
            | Self::UnallocatedRemainder { expense_id, .. }
            | Self::NonPositiveAmount { expense_id, .. } => Some(*expense_id),
            Self::InternalInconsistency { .. } => None,
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        if err.is_client_error() {
            Self::Validation(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}
