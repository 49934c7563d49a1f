//! Settlement routes.
//!
//! Two paths reach the engine: client previews post the records they hold,
//! persisted summaries read the trip from the snapshot store. Both compute
//! through `SettlementService`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info, warn};
use wayfare_core::settlement::{
    Expense, Member, ResolvedShares, SettlementError, SettlementService, SettlementSummary, Split,
    group_splits_by_expense,
};
use wayfare_shared::{AppError, types::TripId};

use crate::{AppState, error::ApiError};

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses/resolve", post(resolve_expense))
        .route("/settlements/preview", post(preview_settlement))
        .route("/trips/{trip_id}/settlement", get(get_trip_settlement))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for resolving a single expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveExpenseRequest {
    /// The expense to resolve.
    pub expense: Expense,
    /// Its split rows, in display order.
    #[serde(default)]
    pub splits: Vec<Split>,
}

/// Request body for previewing a settlement from unsaved records.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSettlementRequest {
    /// Trip members.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Expenses to settle.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Split rows for all expenses.
    #[serde(default)]
    pub splits: Vec<Split>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Logs an engine failure at a level matching its cause.
fn log_failure(err: SettlementError) -> SettlementError {
    if err.is_client_error() {
        warn!(error = %err, "Rejected expense records");
    } else {
        error!(error = %err, "Settlement engine fault");
    }
    err
}

/// POST `/expenses/resolve` - Resolve one expense into owed amounts.
async fn resolve_expense(
    Json(request): Json<ResolveExpenseRequest>,
) -> Result<Json<ResolvedShares>, ApiError> {
    let resolved = SettlementService::resolve_expense(&request.expense, &request.splits)
        .map_err(log_failure)?;
    Ok(Json(resolved))
}

/// POST `/settlements/preview` - Settle records that have not been saved yet.
async fn preview_settlement(
    Json(request): Json<PreviewSettlementRequest>,
) -> Result<Json<SettlementSummary>, ApiError> {
    let splits = group_splits_by_expense(&request.splits);
    let summary =
        SettlementService::compute_settlement_summary(&request.members, &request.expenses, &splits)
            .map_err(log_failure)?;
    Ok(Json(summary))
}

/// GET `/trips/{trip_id}/settlement` - Settle a stored trip.
async fn get_trip_settlement(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<SettlementSummary>, ApiError> {
    let snapshot = state
        .store
        .trip_snapshot(trip_id)
        .ok_or_else(|| AppError::NotFound(format!("Trip {trip_id}")))?;

    let summary = SettlementService::compute_snapshot_summary(&snapshot).map_err(log_failure)?;

    info!(
        trip_id = %trip_id,
        settlements = summary.settlements.len(),
        total_expenses = %summary.total_expenses,
        "Computed trip settlement"
    );
    Ok(Json(summary))
}
