//! Expense splitting and settlement.
//!
//! This module implements the trip cost-sharing engine:
//! - Share resolution (amount, percentage, and equal splits)
//! - Balance aggregation per member
//! - Greedy settlement planning
//! - Summary assembly for the API boundary
//! - Snapshot store port for persisted records

pub mod balance;
pub mod error;
pub mod planner;
pub mod resolver;
pub mod service;
pub mod store;
pub mod summary;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{BalanceAggregator, MemberBalance};
pub use error::SettlementError;
pub use planner::{Settlement, SettlementPlanner};
pub use resolver::ShareResolver;
pub use service::SettlementService;
pub use store::{InMemorySnapshotStore, SnapshotStore, StoreError};
pub use summary::SettlementSummary;
pub use types::{
    Expense, Member, MemberShare, ResolvedShares, ShareType, Split, SplitsByExpense,
    TripSnapshot, group_splits_by_expense,
};
