//! Settlement summary returned to callers.

use serde::{Deserialize, Serialize};
use wayfare_shared::types::{MemberId, Money};

use super::balance::MemberBalance;
use super::planner::Settlement;
use super::types::Member;

/// Balances, transfers, and totals for one trip.
///
/// Always computed from a full snapshot, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    /// Trip members, in the order supplied.
    pub members: Vec<Member>,
    /// One balance per member, in member order. Empty when no expense was settled.
    pub balances: Vec<MemberBalance>,
    /// Transfers in the order the planner emitted them.
    pub settlements: Vec<Settlement>,
    /// Sum of all settled expense amounts.
    pub total_expenses: Money,
}

impl SettlementSummary {
    /// Summary for a trip without expenses.
    #[must_use]
    pub const fn empty(members: Vec<Member>) -> Self {
        Self {
            members,
            balances: Vec::new(),
            settlements: Vec::new(),
            total_expenses: Money::ZERO,
        }
    }

    /// Returns true if nobody owes anybody anything.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settlements.is_empty()
    }

    /// Returns the balance of one member.
    #[must_use]
    pub fn balance_of(&self, member_id: MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|b| b.member_id == member_id)
    }

    /// Transfers a member has to make.
    pub fn payments_from(&self, member_id: MemberId) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(move |s| s.from == member_id)
    }

    /// Transfers a member will receive.
    pub fn payments_to(&self, member_id: MemberId) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(move |s| s.to == member_id)
    }
}
