//! Settlement service: the single entry point for share resolution and
//! trip-wide settlement.
//!
//! Client previews and persisted summaries both go through this service, so
//! there is exactly one implementation of the rounding and matching rules.

use std::collections::HashSet;

use tracing::debug;
use wayfare_shared::types::{MemberId, Money};

use super::balance::BalanceAggregator;
use super::error::SettlementError;
use super::planner::SettlementPlanner;
use super::resolver::ShareResolver;
use super::summary::SettlementSummary;
use super::types::{Expense, Member, ResolvedShares, Split, SplitsByExpense, TripSnapshot};

/// Settlement service for expense resolution and summary computation.
///
/// Stateless: every call takes the complete input and recomputes from scratch.
pub struct SettlementService;

impl SettlementService {
    /// Resolve one expense's splits into per-member owed amounts.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError` if the splits cannot be resolved exactly.
    pub fn resolve_expense(
        expense: &Expense,
        splits: &[Split],
    ) -> Result<ResolvedShares, SettlementError> {
        ShareResolver::resolve(expense, splits)
    }

    /// Compute balances and transfers for a trip.
    ///
    /// The process:
    /// 1. Expenses paid by a member outside `members` are skipped
    /// 2. Each remaining expense is resolved; any failure aborts the computation
    /// 3. Resolved shares are folded into one balance per member
    /// 4. Balances are matched into transfers
    ///
    /// When no expense survives step 1 the summary has no balances at all,
    /// while a trip of only self-funded expenses gets one zero balance per member.
    ///
    /// # Errors
    ///
    /// - Any resolution error of any expense
    /// - `InvalidSplit` if a split references a member outside `members`
    /// - `InternalInconsistency` if the balances fail to sum to zero
    pub fn compute_settlement_summary(
        members: &[Member],
        expenses: &[Expense],
        splits_by_expense: &SplitsByExpense,
    ) -> Result<SettlementSummary, SettlementError> {
        let known: HashSet<MemberId> = members.iter().map(|m| m.id).collect();

        let mut total_expenses = Money::ZERO;
        let mut resolutions = Vec::with_capacity(expenses.len());

        for expense in expenses {
            if !known.contains(&expense.payer_id) {
                debug!(
                    expense_id = %expense.id,
                    payer_id = %expense.payer_id,
                    "Skipping expense paid by a removed member"
                );
                continue;
            }

            let splits = splits_by_expense
                .get(&expense.id)
                .map_or(&[][..], Vec::as_slice);
            if let Some(orphan) = splits.iter().find(|s| !known.contains(&s.member_id)) {
                return Err(SettlementError::invalid_split(
                    expense.id,
                    format!("split references unknown member {}", orphan.member_id),
                ));
            }

            let resolved = ShareResolver::resolve(expense, splits)?;
            total_expenses = total_expenses.checked_add(expense.amount).ok_or_else(|| {
                SettlementError::invalid_split(expense.id, "expense total overflows")
            })?;
            resolutions.push(resolved);
        }

        let expense_ids: HashSet<_> = expenses.iter().map(|e| e.id).collect();
        for expense_id in splits_by_expense.keys().filter(|id| !expense_ids.contains(id)) {
            debug!(expense_id = %expense_id, "Ignoring splits for unknown expense");
        }

        if resolutions.is_empty() {
            return Ok(SettlementSummary::empty(members.to_vec()));
        }

        let balances = BalanceAggregator::aggregate(members, &resolutions)?;
        let settlements = SettlementPlanner::plan_balances(&balances)?;

        debug!(
            members = members.len(),
            expenses = resolutions.len(),
            settlements = settlements.len(),
            total_expenses = %total_expenses,
            "Computed settlement summary"
        );

        Ok(SettlementSummary {
            members: members.to_vec(),
            balances,
            settlements,
            total_expenses,
        })
    }

    /// Compute the settlement summary for a stored trip snapshot.
    ///
    /// # Errors
    ///
    /// See [`Self::compute_settlement_summary`].
    pub fn compute_snapshot_summary(
        snapshot: &TripSnapshot,
    ) -> Result<SettlementSummary, SettlementError> {
        Self::compute_settlement_summary(
            &snapshot.members,
            &snapshot.expenses,
            &snapshot.splits_by_expense(),
        )
    }
}
