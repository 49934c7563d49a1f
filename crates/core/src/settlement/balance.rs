//! Member balance aggregation.
//!
//! balance = total paid - total owed. Positive means the member is owed
//! money overall, negative means they owe money.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wayfare_shared::types::{MemberId, Money};

use super::error::SettlementError;
use super::types::{Member, ResolvedShares};

/// A member's net position across all of a trip's expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBalance {
    /// The member.
    pub member_id: MemberId,
    /// Sum of expenses paid by the member.
    pub total_paid: Money,
    /// Sum of the member's resolved shares.
    pub total_owed: Money,
    /// `total_paid - total_owed`.
    pub balance: Money,
}

impl MemberBalance {
    /// Creates a zero balance for a member.
    #[must_use]
    pub const fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            balance: Money::ZERO,
        }
    }

    /// Records an amount paid by the member.
    pub fn add_paid(&mut self, amount: Money) {
        self.total_paid += amount;
        self.balance = self.total_paid - self.total_owed;
    }

    /// Records a share owed by the member.
    pub fn add_owed(&mut self, amount: Money) {
        self.total_owed += amount;
        self.balance = self.total_paid - self.total_owed;
    }
}

/// Aggregator folding resolved expenses into member balances.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Compute one balance per member, in member order.
    ///
    /// Self-funded expenses are left out of both sides.
    ///
    /// # Errors
    ///
    /// - `InvalidSplit` if a payer or share references a member outside `members`
    /// - `InternalInconsistency` if the balances do not sum to zero
    pub fn aggregate(
        members: &[Member],
        resolutions: &[ResolvedShares],
    ) -> Result<Vec<MemberBalance>, SettlementError> {
        let mut balances: Vec<MemberBalance> =
            members.iter().map(|m| MemberBalance::new(m.id)).collect();
        let index: HashMap<MemberId, usize> = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id, i))
            .collect();

        for resolved in resolutions.iter().filter(|r| !r.is_self_funded()) {
            let payer = index.get(&resolved.payer_id).ok_or_else(|| {
                SettlementError::invalid_split(
                    resolved.expense_id,
                    format!("payer {} is not a member of the trip", resolved.payer_id),
                )
            })?;
            balances[*payer].add_paid(resolved.total);

            for share in &resolved.shares {
                let debtor = index.get(&share.member_id).ok_or_else(|| {
                    SettlementError::invalid_split(
                        resolved.expense_id,
                        format!("split references unknown member {}", share.member_id),
                    )
                })?;
                balances[*debtor].add_owed(share.amount);
            }
        }

        let imbalance: Money = balances.iter().map(|b| b.balance).sum();
        if !imbalance.is_zero() {
            return Err(SettlementError::InternalInconsistency { imbalance });
        }

        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_shared::types::{ExpenseId, TripId};

    use crate::settlement::types::MemberShare;

    fn member(name: &str) -> Member {
        Member {
            id: MemberId::new(),
            trip_id: TripId::new(),
            user_id: None,
            name: name.to_string(),
        }
    }

    fn resolved(payer: &Member, total: i64, shares: &[(&Member, i64)]) -> ResolvedShares {
        ResolvedShares {
            expense_id: ExpenseId::new(),
            payer_id: payer.id,
            total: Money::new(total),
            shares: shares
                .iter()
                .map(|(m, amount)| MemberShare {
                    member_id: m.id,
                    amount: Money::new(*amount),
                })
                .collect(),
        }
    }

    #[test]
    fn test_member_balance_tracks_net() {
        let mut balance = MemberBalance::new(MemberId::new());
        balance.add_paid(Money::new(3000));
        balance.add_owed(Money::new(1000));
        assert_eq!(balance.balance, Money::new(2000));

        balance.add_owed(Money::new(2500));
        assert_eq!(balance.balance, Money::new(-500));
    }

    #[test]
    fn test_aggregate_single_expense() {
        let (a, b, c) = (member("A"), member("B"), member("C"));
        let resolutions = vec![resolved(&a, 3000, &[(&a, 1000), (&b, 1000), (&c, 1000)])];

        let balances = BalanceAggregator::aggregate(&[a.clone(), b, c], &resolutions).unwrap();
        let nets: Vec<i64> = balances.iter().map(|x| x.balance.minor_units()).collect();
        assert_eq!(nets, vec![2000, -1000, -1000]);
        assert_eq!(balances[0].member_id, a.id);
        assert_eq!(balances[0].total_paid, Money::new(3000));
        assert_eq!(balances[0].total_owed, Money::new(1000));
    }

    #[test]
    fn test_aggregate_keeps_member_order_and_idle_members() {
        let (a, b, idle) = (member("A"), member("B"), member("Idle"));
        let resolutions = vec![
            resolved(&a, 100, &[(&b, 100)]),
            resolved(&b, 40, &[(&a, 20), (&b, 20)]),
        ];

        let members = vec![idle.clone(), a, b];
        let balances = BalanceAggregator::aggregate(&members, &resolutions).unwrap();
        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0], MemberBalance::new(idle.id));
        assert_eq!(balances[1].balance, Money::new(80));
        assert_eq!(balances[2].balance, Money::new(-80));
    }

    #[test]
    fn test_self_funded_excluded_from_both_sides() {
        let (a, b) = (member("A"), member("B"));
        let resolutions = vec![resolved(&a, 5000, &[])];

        let balances = BalanceAggregator::aggregate(&[a, b], &resolutions).unwrap();
        assert!(balances.iter().all(|x| x.total_paid.is_zero()));
        assert!(balances.iter().all(|x| x.total_owed.is_zero()));
    }

    #[test]
    fn test_unknown_share_member_rejected() {
        let (a, outsider) = (member("A"), member("Outsider"));
        let resolutions = vec![resolved(&a, 100, &[(&a, 50), (&outsider, 50)])];

        let err = BalanceAggregator::aggregate(&[a], &resolutions).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidSplit { .. }));
    }

    #[test]
    fn test_short_resolution_is_inconsistency() {
        let (a, b) = (member("A"), member("B"));
        // Shares cover only 90 of 100
        let resolutions = vec![resolved(&a, 100, &[(&a, 45), (&b, 45)])];

        let err = BalanceAggregator::aggregate(&[a, b], &resolutions).unwrap_err();
        assert_eq!(
            err,
            SettlementError::InternalInconsistency {
                imbalance: Money::new(10)
            }
        );
    }
}
