//! Share resolution for a single expense.
//!
//! Split rules are applied in a fixed order:
//! 1. Amount shares are assigned as given
//! 2. Percentage shares are floored against the whole expense amount
//! 3. Whatever remains is divided among equal shares, the first
//!    `remaining mod k` of them (in split order) receiving one extra unit
//!
//! The resolved shares always sum exactly to the expense amount.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use wayfare_shared::types::{ExpenseId, Money};

use super::error::SettlementError;
use super::types::{Expense, MemberShare, ResolvedShares, ShareType, Split};

/// Resolver turning split rules into exact owed amounts.
pub struct ShareResolver;

impl ShareResolver {
    /// Resolve one expense's splits into per-member owed amounts.
    ///
    /// An expense without splits resolves to an empty share list: the payer
    /// covers it alone and nobody owes anything for it.
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` if the expense amount is zero or negative
    /// - `InvalidSplit` for malformed rows, duplicate members, amount shares
    ///   above the total, or percentages above 100
    /// - `OverAllocated` if amount and percentage shares together exceed the total
    /// - `UnallocatedRemainder` if something is left with no equal share to take it
    pub fn resolve(expense: &Expense, splits: &[Split]) -> Result<ResolvedShares, SettlementError> {
        let total = expense.amount;
        if !total.is_positive() {
            return Err(SettlementError::NonPositiveAmount {
                expense_id: expense.id,
                amount: total,
            });
        }

        let mut resolved = ResolvedShares {
            expense_id: expense.id,
            payer_id: expense.payer_id,
            total,
            shares: Vec::with_capacity(splits.len()),
        };
        if splits.is_empty() {
            return Ok(resolved);
        }

        Self::validate_rows(expense.id, splits)?;

        let mut owed = vec![Money::ZERO; splits.len()];

        // 1. Amount shares
        let mut amount_total = Money::ZERO;
        for (idx, split) in Self::of_type(splits, ShareType::Amount) {
            let share = Self::amount_share(expense.id, split)?;
            amount_total = amount_total.checked_add(share).ok_or_else(|| {
                SettlementError::invalid_split(expense.id, "amount shares overflow")
            })?;
            owed[idx] = share;
        }
        if amount_total > total {
            return Err(SettlementError::invalid_split(
                expense.id,
                format!("amount shares sum to {amount_total}, exceeding the total of {total}"),
            ));
        }

        // 2. Percentage shares, always against the whole amount
        let mut percent_total = Decimal::ZERO;
        let mut percentage_total = Money::ZERO;
        for (idx, split) in Self::of_type(splits, ShareType::Percentage) {
            let percent = Self::percentage_value(expense.id, split)?;
            percent_total += percent;
            if percent_total > Decimal::ONE_HUNDRED {
                return Err(SettlementError::invalid_split(
                    expense.id,
                    format!("percentage shares sum to more than 100 ({percent_total})"),
                ));
            }
            let share = Self::percentage_share(expense.id, total, percent)?;
            percentage_total = percentage_total
                .checked_add(share)
                .ok_or_else(|| Self::overflowing(expense))?;
            owed[idx] = share;
        }

        // 3. Remainder
        let allocated = amount_total
            .checked_add(percentage_total)
            .ok_or_else(|| Self::overflowing(expense))?;
        if allocated > total {
            return Err(SettlementError::OverAllocated {
                expense_id: expense.id,
                total,
                allocated,
            });
        }
        let remaining = total - allocated;

        // 4. Equal shares
        let equal: Vec<usize> = Self::of_type(splits, ShareType::Equal)
            .map(|(idx, _)| idx)
            .collect();
        if equal.is_empty() {
            if remaining.is_positive() {
                return Err(SettlementError::UnallocatedRemainder {
                    expense_id: expense.id,
                    remainder: remaining,
                });
            }
        } else {
            for (idx, share) in equal.iter().zip(Self::divide_evenly(remaining, equal.len())) {
                owed[*idx] = share;
            }
        }

        resolved.shares = splits
            .iter()
            .zip(owed)
            .map(|(split, amount)| MemberShare {
                member_id: split.member_id,
                amount,
            })
            .collect();

        debug_assert_eq!(resolved.allocated(), total);
        Ok(resolved)
    }

    /// Divide `amount` into `count` parts that differ by at most one unit,
    /// the larger parts first.
    ///
    /// Returns an empty vector when `count` is zero.
    #[must_use]
    pub fn divide_evenly(amount: Money, count: usize) -> Vec<Money> {
        let Ok(divisor) = i64::try_from(count) else {
            return vec![];
        };
        if divisor == 0 {
            return vec![];
        }

        let base = amount.minor_units() / divisor;
        let extra = amount.minor_units() % divisor;

        (0..divisor)
            .map(|i| Money::new(if i < extra { base + 1 } else { base }))
            .collect()
    }

    /// Shares whose sum no longer fits in `Money` exceed any expense total.
    /// `allocated` saturates at the largest representable amount.
    const fn overflowing(expense: &Expense) -> SettlementError {
        SettlementError::OverAllocated {
            expense_id: expense.id,
            total: expense.amount,
            allocated: Money::new(i64::MAX),
        }
    }

    /// Splits of one share type, with their positions in the full list.
    fn of_type(splits: &[Split], share_type: ShareType) -> impl Iterator<Item = (usize, &Split)> {
        splits
            .iter()
            .enumerate()
            .filter(move |(_, split)| split.share_type == share_type)
    }

    /// Rejects rows that belong elsewhere or repeat a member.
    fn validate_rows(expense_id: ExpenseId, splits: &[Split]) -> Result<(), SettlementError> {
        let mut seen = HashSet::with_capacity(splits.len());
        for split in splits {
            if split.expense_id != expense_id {
                return Err(SettlementError::invalid_split(
                    expense_id,
                    format!(
                        "split for member {} belongs to expense {}",
                        split.member_id, split.expense_id
                    ),
                ));
            }
            if !seen.insert(split.member_id) {
                return Err(SettlementError::invalid_split(
                    expense_id,
                    format!("member {} has more than one split", split.member_id),
                ));
            }
        }
        Ok(())
    }

    fn required_value(expense_id: ExpenseId, split: &Split) -> Result<Decimal, SettlementError> {
        let value = split.share_value.ok_or_else(|| {
            SettlementError::invalid_split(
                expense_id,
                format!(
                    "{} split for member {} has no share value",
                    split.share_type, split.member_id
                ),
            )
        })?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(SettlementError::invalid_split(
                expense_id,
                format!(
                    "{} split for member {} is negative ({value})",
                    split.share_type, split.member_id
                ),
            ));
        }
        Ok(value)
    }

    fn amount_share(expense_id: ExpenseId, split: &Split) -> Result<Money, SettlementError> {
        let value = Self::required_value(expense_id, split)?;
        if !value.fract().is_zero() {
            return Err(SettlementError::invalid_split(
                expense_id,
                format!(
                    "amount split for member {} is not a whole number of minor units ({value})",
                    split.member_id
                ),
            ));
        }
        value.to_i64().map(Money::new).ok_or_else(|| {
            SettlementError::invalid_split(
                expense_id,
                format!("amount split for member {} is out of range", split.member_id),
            )
        })
    }

    fn percentage_value(expense_id: ExpenseId, split: &Split) -> Result<Decimal, SettlementError> {
        Self::required_value(expense_id, split)
    }

    /// `floor(total * percent / 100)`.
    fn percentage_share(
        expense_id: ExpenseId,
        total: Money,
        percent: Decimal,
    ) -> Result<Money, SettlementError> {
        Decimal::from(total.minor_units())
            .checked_mul(percent)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|share| share.floor().to_i64())
            .map(Money::new)
            .ok_or_else(|| {
                SettlementError::invalid_split(expense_id, "percentage share is out of range")
            })
    }
}
