//! Domain types for trip cost sharing.
//!
//! Members, expenses, and splits are the persisted records handed to the
//! engine. Everything else in this module is derived on every computation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wayfare_shared::types::{ExpenseId, ItemId, MemberId, Money, TripId, UserId};

/// A participant in a trip's cost sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member ID.
    pub id: MemberId,
    /// Trip the member belongs to.
    pub trip_id: TripId,
    /// Linked user account. `None` for guests.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Display name.
    pub name: String,
}

impl Member {
    /// Returns true if the member is not tied to a user account.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

/// A single payment made by one member on behalf of the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Member who paid.
    pub payer_id: MemberId,
    /// Amount paid, in minor units.
    pub amount: Money,
    /// Itinerary item this expense belongs to, if any.
    #[serde(default)]
    pub item_id: Option<ItemId>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// How a split row's share of an expense is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    /// Even share of whatever is left after fixed and percentage shares.
    Equal,
    /// Percentage of the whole expense amount.
    Percentage,
    /// Fixed amount in minor units.
    Amount,
}

impl std::fmt::Display for ShareType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Percentage => write!(f, "percentage"),
            Self::Amount => write!(f, "amount"),
        }
    }
}

/// One member's participation in one expense.
///
/// A member without a split row for an expense does not share its cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    /// Expense being split.
    pub expense_id: ExpenseId,
    /// Participating member.
    pub member_id: MemberId,
    /// Share rule.
    pub share_type: ShareType,
    /// Percentage or amount, depending on `share_type`. Ignored for `equal`.
    #[serde(default)]
    pub share_value: Option<Decimal>,
}

impl Split {
    /// Creates an equal-share split.
    #[must_use]
    pub const fn equal(expense_id: ExpenseId, member_id: MemberId) -> Self {
        Self {
            expense_id,
            member_id,
            share_type: ShareType::Equal,
            share_value: None,
        }
    }

    /// Creates a percentage split.
    #[must_use]
    pub const fn percentage(expense_id: ExpenseId, member_id: MemberId, percent: Decimal) -> Self {
        Self {
            expense_id,
            member_id,
            share_type: ShareType::Percentage,
            share_value: Some(percent),
        }
    }

    /// Creates a fixed-amount split.
    #[must_use]
    pub fn amount(expense_id: ExpenseId, member_id: MemberId, amount: Money) -> Self {
        Self {
            expense_id,
            member_id,
            share_type: ShareType::Amount,
            share_value: Some(Decimal::from(amount.minor_units())),
        }
    }
}

/// Splits grouped by the expense they belong to, each group in row order.
pub type SplitsByExpense = HashMap<ExpenseId, Vec<Split>>;

/// Groups a flat list of split rows by expense, preserving row order.
#[must_use]
pub fn group_splits_by_expense(splits: &[Split]) -> SplitsByExpense {
    let mut grouped = SplitsByExpense::new();
    for split in splits {
        grouped
            .entry(split.expense_id)
            .or_default()
            .push(split.clone());
    }
    grouped
}

/// The amount one member owes for one expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberShare {
    /// Member who owes the share.
    pub member_id: MemberId,
    /// Owed amount.
    pub amount: Money,
}

/// Result of resolving one expense's splits.
///
/// Shares are listed in split order and sum exactly to `total`, unless the
/// expense had no splits at all, in which case the payer covers it alone and
/// `shares` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShares {
    /// Resolved expense.
    pub expense_id: ExpenseId,
    /// Member who paid.
    pub payer_id: MemberId,
    /// Expense amount.
    pub total: Money,
    /// Owed amount per participating member.
    pub shares: Vec<MemberShare>,
}

impl ResolvedShares {
    /// Returns true if nobody shares the expense with the payer.
    #[must_use]
    pub fn is_self_funded(&self) -> bool {
        self.shares.is_empty()
    }

    /// Returns the amount `member_id` owes, if they participate.
    #[must_use]
    pub fn owed_by(&self, member_id: MemberId) -> Option<Money> {
        self.shares
            .iter()
            .find(|share| share.member_id == member_id)
            .map(|share| share.amount)
    }

    /// Sum of all shares.
    #[must_use]
    pub fn allocated(&self) -> Money {
        self.shares.iter().map(|share| share.amount).sum()
    }

    /// Shares keyed by member.
    #[must_use]
    pub fn to_map(&self) -> HashMap<MemberId, Money> {
        self.shares
            .iter()
            .map(|share| (share.member_id, share.amount))
            .collect()
    }
}

/// A consistent read of one trip's cost-sharing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    /// Trip the records belong to.
    pub trip_id: TripId,
    /// Trip members, in display order.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Expenses, in creation order.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Split rows for all expenses.
    #[serde(default)]
    pub splits: Vec<Split>,
}

impl TripSnapshot {
    /// Creates an empty snapshot for a trip.
    #[must_use]
    pub const fn new(trip_id: TripId) -> Self {
        Self {
            trip_id,
            members: Vec::new(),
            expenses: Vec::new(),
            splits: Vec::new(),
        }
    }

    /// Groups this snapshot's split rows by expense.
    #[must_use]
    pub fn splits_by_expense(&self) -> SplitsByExpense {
        group_splits_by_expense(&self.splits)
    }

    /// Returns true if `member_id` belongs to this trip.
    #[must_use]
    pub fn has_member(&self, member_id: MemberId) -> bool {
        self.members.iter().any(|member| member.id == member_id)
    }
}
