//! Snapshot store port and an in-memory implementation.
//!
//! The engine only ever reads whole snapshots. Write operations live on the
//! concrete store and keep the records consistent the way the persistence
//! layer does, most notably the cascading removal of members.

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;
use wayfare_shared::types::{ExpenseId, MemberId, TripId};

use super::types::{Expense, Member, Split, TripSnapshot};

/// Read access to consistent trip snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Returns a consistent copy of a trip's records, if the trip exists.
    fn trip_snapshot(&self, trip_id: TripId) -> Option<TripSnapshot>;
}

/// Errors raised by store write operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Trip not found.
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    /// Member does not belong to the trip.
    #[error("Member {member_id} is not part of trip {trip_id}")]
    MemberNotFound {
        /// Trip searched.
        trip_id: TripId,
        /// Missing member.
        member_id: MemberId,
    },

    /// A split was submitted for a different expense.
    #[error("Split for member {member_id} does not belong to expense {expense_id}")]
    SplitMismatch {
        /// Expense being added.
        expense_id: ExpenseId,
        /// Member of the offending split.
        member_id: MemberId,
    },
}

/// Thread-safe in-memory snapshot store.
///
/// Each trip lives under its own map entry, so a write to one trip never
/// blocks reads of another and readers always get a whole snapshot.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    trips: DashMap<TripId, TripSnapshot>,
}

impl InMemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = TripSnapshot>) -> Self {
        let store = Self::new();
        for snapshot in snapshots {
            store.put_snapshot(snapshot);
        }
        store
    }

    /// Number of trips held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Returns true if no trip is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Inserts or replaces a whole trip snapshot.
    pub fn put_snapshot(&self, snapshot: TripSnapshot) {
        self.trips.insert(snapshot.trip_id, snapshot);
    }

    /// Adds a member to their trip, creating the trip if needed.
    pub fn add_member(&self, member: Member) {
        let trip_id = member.trip_id;
        self.trips
            .entry(trip_id)
            .or_insert_with(|| TripSnapshot::new(trip_id))
            .members
            .push(member);
    }

    /// Adds an expense together with its splits.
    ///
    /// # Errors
    ///
    /// Fails if the trip is unknown, if the payer or a split member is not
    /// part of the trip, or if a split belongs to another expense.
    pub fn add_expense(
        &self,
        trip_id: TripId,
        expense: Expense,
        splits: Vec<Split>,
    ) -> Result<(), StoreError> {
        let mut trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or(StoreError::TripNotFound(trip_id))?;

        if !trip.has_member(expense.payer_id) {
            return Err(StoreError::MemberNotFound {
                trip_id,
                member_id: expense.payer_id,
            });
        }
        for split in &splits {
            if split.expense_id != expense.id {
                return Err(StoreError::SplitMismatch {
                    expense_id: expense.id,
                    member_id: split.member_id,
                });
            }
            if !trip.has_member(split.member_id) {
                return Err(StoreError::MemberNotFound {
                    trip_id,
                    member_id: split.member_id,
                });
            }
        }

        trip.expenses.push(expense);
        trip.splits.extend(splits);
        Ok(())
    }

    /// Removes an expense and its splits. Returns false if it did not exist.
    pub fn remove_expense(&self, trip_id: TripId, expense_id: ExpenseId) -> bool {
        let Some(mut trip) = self.trips.get_mut(&trip_id) else {
            return false;
        };

        let before = trip.expenses.len();
        trip.expenses.retain(|e| e.id != expense_id);
        trip.splits.retain(|s| s.expense_id != expense_id);
        trip.expenses.len() != before
    }

    /// Removes a member, every expense they paid, and every split that
    /// references them or one of those expenses.
    ///
    /// Returns false if the member did not exist.
    pub fn remove_member(&self, trip_id: TripId, member_id: MemberId) -> bool {
        let Some(mut trip) = self.trips.get_mut(&trip_id) else {
            return false;
        };
        if !trip.has_member(member_id) {
            return false;
        }

        let paid: Vec<ExpenseId> = trip
            .expenses
            .iter()
            .filter(|e| e.payer_id == member_id)
            .map(|e| e.id)
            .collect();

        trip.members.retain(|m| m.id != member_id);
        trip.expenses.retain(|e| e.payer_id != member_id);
        trip.splits
            .retain(|s| s.member_id != member_id && !paid.contains(&s.expense_id));

        debug!(
            trip_id = %trip_id,
            member_id = %member_id,
            expenses_removed = paid.len(),
            "Removed member with cascading expenses and splits"
        );
        true
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn trip_snapshot(&self, trip_id: TripId) -> Option<TripSnapshot> {
        self.trips.get(&trip_id).map(|trip| trip.value().clone())
    }
}
