//! Expense entry routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use hearthbook_core::settlement::{EntryKind, SplitInput};
use hearthbook_db::ExpenseRepository;
use hearthbook_db::repositories::expense::{CreateExpenseInput, ExpenseError, ExpenseWithSplits};
use hearthbook_shared::Period;

use super::{error_response, parse_money};
use crate::AppState;

/// Request body for creating an expense entry.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// `expense` or `income`.
    pub entry_type: EntryKind,
    /// Calendar date, `YYYY-MM-DD`.
    pub entry_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Total amount as a decimal string.
    pub amount: String,
    /// Paying member; required when splits are present.
    pub payer_id: Option<Uuid>,
    /// Proposed shares; omit for an unsplit entry.
    #[serde(default)]
    pub splits: Vec<SplitShareRequest>,
}

/// One proposed share as it appears in request bodies.
#[derive(Debug, Deserialize)]
pub struct SplitShareRequest {
    /// The member owing this share.
    pub debtor_id: Option<Uuid>,
    /// Share amount as a decimal string.
    pub amount: String,
}

/// Request body for replacing an entry's splits.
#[derive(Debug, Deserialize)]
pub struct ReplaceSplitsRequest {
    /// The new full set of shares.
    pub splits: Vec<SplitShareRequest>,
}

fn parse_splits(
    shares: Vec<SplitShareRequest>,
) -> Result<Vec<SplitInput>, axum::response::Response> {
    shares
        .into_iter()
        .map(|share| {
            Ok(SplitInput {
                debtor_id: share.debtor_id,
                amount: parse_money(&share.amount)?,
            })
        })
        .collect()
}

/// Optional period filter on expense listings.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// First day, `YYYY-MM-DD`.
    pub from: Option<NaiveDate>,
    /// Last day, `YYYY-MM-DD`.
    pub to: Option<NaiveDate>,
}

/// Creates the expenses router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/households/{household_id}/expenses", post(create_expense))
        .route("/households/{household_id}/expenses", get(list_expenses))
        .route(
            "/households/{household_id}/expenses/{entry_id}",
            delete(delete_expense),
        )
        .route(
            "/households/{household_id}/expenses/{entry_id}/splits",
            put(replace_splits),
        )
}

fn repo_error(e: &ExpenseError) -> axum::response::Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

fn expense_json(expense: &ExpenseWithSplits) -> serde_json::Value {
    json!({
        "entry": expense.entry,
        "splits": expense.splits,
    })
}

/// POST `/households/{household_id}/expenses` - Create an entry with
/// validated splits.
async fn create_expense(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    let amount = match parse_money(&payload.amount) {
        Ok(a) => a,
        Err(response) => return response,
    };
    let splits = match parse_splits(payload.splits) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let input = CreateExpenseInput {
        household_id,
        entry_type: payload.entry_type,
        entry_date: payload.entry_date,
        description: payload.description,
        amount,
        payer_id: payload.payer_id,
        splits,
    };

    match repo.create_expense(input).await {
        Ok(created) => {
            info!(
                household_id = %household_id,
                entry_id = %created.entry.id,
                splits = created.splits.len(),
                "Expense created"
            );
            (StatusCode::CREATED, Json(expense_json(&created))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to create expense");
            repo_error(&e)
        }
    }
}

/// GET `/households/{household_id}/expenses` - List entries, optionally
/// scoped to a period.
async fn list_expenses(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let period = match (query.from, query.to) {
        (Some(from), Some(to)) => match Period::new(from, to) {
            Ok(p) => Some(p),
            Err(e) => return error_response(400, "INVALID_PERIOD", &e.to_string()),
        },
        (None, None) => None,
        _ => {
            return error_response(
                400,
                "INVALID_PERIOD",
                "Provide both from and to, or neither",
            );
        }
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.list_expenses(household_id, period).await {
        Ok(expenses) => {
            let body: Vec<serde_json::Value> = expenses.iter().map(expense_json).collect();
            (StatusCode::OK, Json(json!(body))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to list expenses");
            repo_error(&e)
        }
    }
}

/// PUT `/households/{household_id}/expenses/{entry_id}/splits` - Replace the
/// entry's splits wholesale.
async fn replace_splits(
    State(state): State<AppState>,
    Path((household_id, entry_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReplaceSplitsRequest>,
) -> impl IntoResponse {
    let splits = match parse_splits(payload.splits) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.replace_splits(household_id, entry_id, splits).await {
        Ok(updated) => {
            info!(
                household_id = %household_id,
                entry_id = %entry_id,
                splits = updated.splits.len(),
                "Splits replaced"
            );
            (StatusCode::OK, Json(expense_json(&updated))).into_response()
        }
        Err(e) => {
            error!(error = %e, entry_id = %entry_id, "Failed to replace splits");
            repo_error(&e)
        }
    }
}

/// DELETE `/households/{household_id}/expenses/{entry_id}` - Soft-delete an
/// entry.
async fn delete_expense(
    State(state): State<AppState>,
    Path((household_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.delete_expense(household_id, entry_id).await {
        Ok(()) => {
            info!(household_id = %household_id, entry_id = %entry_id, "Expense deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, entry_id = %entry_id, "Failed to delete expense");
            repo_error(&e)
        }
    }
}
