//! Core business logic for Wayfare.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The trip itinerary itself (days, items, sharing) is handled elsewhere; what
//! lives here is the cost-sharing engine that turns recorded expenses into
//! balances and settlement transfers.
//!
//! # Modules
//!
//! - `settlement` - Expense splitting, member balances, and settlement planning

pub mod settlement;

pub use settlement::{SettlementError, SettlementService, SettlementSummary};
