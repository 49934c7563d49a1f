//! Property-based tests for the settlement engine.
//!
//! - Exact coverage: resolved shares sum to the expense amount
//! - Zero-sum: member balances always net to zero
//! - Settlement correctness: applying every transfer clears every balance
//! - Bounded plan: at most one transfer fewer than non-zero members

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use wayfare_shared::types::{ExpenseId, MemberId, Money, TripId};

use super::planner::{Settlement, SettlementPlanner};
use super::resolver::ShareResolver;
use super::service::SettlementService;
use super::types::{Expense, Member, ShareType, Split, SplitsByExpense};

/// One member's role in a generated expense.
#[derive(Debug, Clone, Copy)]
enum Role {
    Skip,
    Equal,
    Percent(u32),
    Fixed(i64),
}

/// Strategy for a member role. Percentages and fixed amounts are kept small
/// enough that up to eight members can never over-allocate an expense.
fn role_strategy(total: i64) -> impl Strategy<Value = Role> {
    prop_oneof![
        2 => Just(Role::Skip),
        4 => Just(Role::Equal),
        1 => (0u32..=6).prop_map(Role::Percent),
        1 => (0..=total / 20).prop_map(Role::Fixed),
    ]
}

/// Strategy for one expense: payer index, amount, and a role per member.
fn expense_strategy(member_count: usize) -> impl Strategy<Value = (usize, i64, Vec<Role>)> {
    (0..member_count, 1i64..1_000_000).prop_flat_map(move |(payer, total)| {
        (
            Just(payer),
            Just(total),
            prop::collection::vec(role_strategy(total), member_count),
        )
    })
}

/// Strategy for a whole trip: member count and expenses.
fn trip_strategy() -> impl Strategy<Value = (usize, Vec<(usize, i64, Vec<Role>)>)> {
    (1usize..=8).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(expense_strategy(n), 0..12),
        )
    })
}

fn build_members(n: usize) -> Vec<Member> {
    let trip_id = TripId::new();
    (0..n)
        .map(|i| Member {
            id: MemberId::new(),
            trip_id,
            user_id: None,
            name: format!("member-{i}"),
        })
        .collect()
}

/// Turns roles into split rows. If no row is an equal share, the first row
/// becomes one so that any remainder has somewhere to go.
fn build_splits(expense_id: ExpenseId, members: &[Member], roles: &[Role]) -> Vec<Split> {
    let mut splits: Vec<Split> = members
        .iter()
        .zip(roles)
        .filter_map(|(m, role)| match role {
            Role::Skip => None,
            Role::Equal => Some(Split::equal(expense_id, m.id)),
            Role::Percent(p) => Some(Split::percentage(expense_id, m.id, Decimal::from(*p))),
            Role::Fixed(a) => Some(Split::amount(expense_id, m.id, Money::new(*a))),
        })
        .collect();

    let has_equal = splits.iter().any(|s| s.share_type == ShareType::Equal);
    if let (false, Some(first)) = (has_equal, splits.first_mut()) {
        first.share_type = ShareType::Equal;
        first.share_value = None;
    }
    splits
}

fn build_trip(
    n: usize,
    specs: &[(usize, i64, Vec<Role>)],
) -> (Vec<Member>, Vec<Expense>, SplitsByExpense) {
    let members = build_members(n);
    let mut expenses = Vec::with_capacity(specs.len());
    let mut splits = SplitsByExpense::new();

    for (payer, total, roles) in specs {
        let expense = Expense {
            id: ExpenseId::new(),
            payer_id: members[*payer].id,
            amount: Money::new(*total),
            item_id: None,
            description: None,
        };
        let rows = build_splits(expense.id, &members, roles);
        splits.insert(expense.id, rows);
        expenses.push(expense);
    }

    (members, expenses, splits)
}

fn apply(balances: &mut HashMap<MemberId, Money>, settlements: &[Settlement]) {
    for s in settlements {
        *balances.entry(s.from).or_default() += s.amount;
        *balances.entry(s.to).or_default() -= s.amount;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every resolved expense is covered exactly, with no drift.
    #[test]
    fn prop_exact_coverage((n, specs) in trip_strategy()) {
        let (_, expenses, splits) = build_trip(n, &specs);

        for expense in &expenses {
            let rows = &splits[&expense.id];
            let resolved = ShareResolver::resolve(expense, rows).unwrap();
            if rows.is_empty() {
                prop_assert!(resolved.is_self_funded());
            } else {
                prop_assert_eq!(resolved.allocated(), expense.amount);
                prop_assert_eq!(resolved.shares.len(), rows.len());
            }
        }
    }

    /// Equal shares differ by at most one unit, larger ones first.
    #[test]
    fn prop_equal_shares_are_fair(total in 1i64..10_000_000, k in 1usize..20) {
        let parts = ShareResolver::divide_evenly(Money::new(total), k);

        prop_assert_eq!(parts.len(), k);
        prop_assert_eq!(parts.iter().sum::<Money>(), Money::new(total));
        prop_assert!(parts.windows(2).all(|w| w[0] >= w[1]));
        let spread = parts[0] - parts[k - 1];
        prop_assert!(spread <= Money::new(1));
    }

    /// Balances net to zero and the plan clears them within the bound.
    #[test]
    fn prop_summary_settles_exactly((n, specs) in trip_strategy()) {
        let (members, expenses, splits) = build_trip(n, &specs);

        let summary =
            SettlementService::compute_settlement_summary(&members, &expenses, &splits).unwrap();

        let net: Money = summary.balances.iter().map(|b| b.balance).sum();
        prop_assert_eq!(net, Money::ZERO);

        let expected_total: Money = expenses.iter().map(|e| e.amount).sum();
        prop_assert_eq!(summary.total_expenses, expected_total);

        let mut remaining: HashMap<MemberId, Money> = summary
            .balances
            .iter()
            .map(|b| (b.member_id, b.balance))
            .collect();
        for s in &summary.settlements {
            prop_assert!(s.amount.is_positive());
            prop_assert!(remaining[&s.from].is_negative());
            prop_assert!(remaining[&s.to].is_positive());
        }
        apply(&mut remaining, &summary.settlements);
        prop_assert!(remaining.values().all(|b| b.is_zero()));

        let non_zero = summary.balances.iter().filter(|b| !b.balance.is_zero()).count();
        prop_assert!(summary.settlements.len() <= non_zero.saturating_sub(1));
    }

    /// The planner only moves money from debtors to creditors.
    #[test]
    fn prop_planner_directions(values in prop::collection::vec(-100_000i64..100_000, 1..15)) {
        let ids: Vec<MemberId> = (0..=values.len()).map(|_| MemberId::new()).collect();
        let mut balances: Vec<(MemberId, Money)> = ids
            .iter()
            .zip(&values)
            .map(|(id, v)| (*id, Money::new(*v)))
            .collect();
        let net: Money = balances.iter().map(|(_, b)| *b).sum();
        balances.push((ids[values.len()], -net));

        let plan = SettlementPlanner::plan(&balances).unwrap();
        let initial: HashMap<MemberId, Money> = balances.iter().copied().collect();

        for s in &plan {
            prop_assert!(initial[&s.from].is_negative());
            prop_assert!(initial[&s.to].is_positive());
        }

        let mut remaining = initial;
        apply(&mut remaining, &plan);
        prop_assert!(remaining.values().all(|b| b.is_zero()));
    }

    /// The same input always produces the same summary.
    #[test]
    fn prop_deterministic((n, specs) in trip_strategy()) {
        let (members, expenses, splits) = build_trip(n, &specs);

        let first = SettlementService::compute_settlement_summary(&members, &expenses, &splits).unwrap();
        let second = SettlementService::compute_settlement_summary(&members, &expenses, &splits).unwrap();
        prop_assert_eq!(first, second);
    }
}
