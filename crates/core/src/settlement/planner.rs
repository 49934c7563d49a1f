//! Greedy settlement planning.
//!
//! Repeatedly matches the largest creditor against the largest debtor and
//! transfers the smaller of the two outstanding amounts, so every step zeroes
//! at least one party. This bounds the plan at `n - 1` transfers for `n`
//! members with a non-zero balance. It is not guaranteed to be the globally
//! smallest plan.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use wayfare_shared::types::{MemberId, Money};

use super::balance::MemberBalance;
use super::error::SettlementError;

/// A recommended transfer from a debtor to a creditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Member paying (negative balance).
    pub from: MemberId,
    /// Member receiving (positive balance).
    pub to: MemberId,
    /// Transfer amount, always positive.
    pub amount: Money,
}

/// One side of the matching with its outstanding magnitude.
#[derive(Debug, PartialEq, Eq)]
struct Party {
    member_id: MemberId,
    outstanding: Money,
    order: usize,
}

impl Ord for Party {
    /// Larger outstanding first, then earlier member order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.outstanding
            .cmp(&other.outstanding)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Planner producing the transfer list for a balance vector.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Plan transfers that bring every balance to zero.
    ///
    /// Ties between equally large creditors (or debtors) go to the one listed
    /// first, so the same input always yields the same plan.
    ///
    /// # Errors
    ///
    /// Returns `InternalInconsistency` if the balances do not sum to zero.
    pub fn plan(balances: &[(MemberId, Money)]) -> Result<Vec<Settlement>, SettlementError> {
        let imbalance: Money = balances.iter().map(|(_, balance)| *balance).sum();
        if !imbalance.is_zero() {
            return Err(SettlementError::InternalInconsistency { imbalance });
        }

        let mut creditors = BinaryHeap::new();
        let mut debtors = BinaryHeap::new();
        for (order, (member_id, balance)) in balances.iter().enumerate() {
            let party = Party {
                member_id: *member_id,
                outstanding: balance.abs(),
                order,
            };
            if balance.is_positive() {
                creditors.push(party);
            } else if balance.is_negative() {
                debtors.push(party);
            }
        }

        let mut settlements =
            Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));

        loop {
            match (creditors.pop(), debtors.pop()) {
                (Some(mut creditor), Some(mut debtor)) => {
                    let amount = creditor.outstanding.min(debtor.outstanding);
                    settlements.push(Settlement {
                        from: debtor.member_id,
                        to: creditor.member_id,
                        amount,
                    });

                    creditor.outstanding -= amount;
                    debtor.outstanding -= amount;
                    if creditor.outstanding.is_positive() {
                        creditors.push(creditor);
                    }
                    if debtor.outstanding.is_positive() {
                        debtors.push(debtor);
                    }
                }
                (None, None) => break,
                (Some(left), None) => {
                    return Err(SettlementError::InternalInconsistency {
                        imbalance: left.outstanding,
                    });
                }
                (None, Some(left)) => {
                    return Err(SettlementError::InternalInconsistency {
                        imbalance: -left.outstanding,
                    });
                }
            }
        }

        Ok(settlements)
    }

    /// Plan transfers for aggregated member balances.
    ///
    /// # Errors
    ///
    /// Returns `InternalInconsistency` if the balances do not sum to zero.
    pub fn plan_balances(balances: &[MemberBalance]) -> Result<Vec<Settlement>, SettlementError> {
        let pairs: Vec<(MemberId, Money)> = balances
            .iter()
            .map(|b| (b.member_id, b.balance))
            .collect();
        Self::plan(&pairs)
    }
}
