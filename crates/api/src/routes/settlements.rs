//! Settlement ledger routes: summary, recording, undo, and drafts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use hearthbook_core::settlement::{net_balances, suggest_transfers};
use hearthbook_db::SettlementRepository;
use hearthbook_db::repositories::settlement::{SettlementOpError, SettlementWithItems};

use super::{PeriodParams, error_response, parse_money};
use crate::AppState;

/// Request body for settling one specific split.
#[derive(Debug, Deserialize)]
pub struct SettleSplitRequest {
    /// First day of the period, `YYYY-MM-DD`.
    pub from: NaiveDate,
    /// Last day of the period, `YYYY-MM-DD`.
    pub to: NaiveDate,
    /// The split being paid down.
    pub split_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
}

/// Request body for settling a debtor/creditor pair.
#[derive(Debug, Deserialize)]
pub struct SettlePairRequest {
    /// First day of the period, `YYYY-MM-DD`.
    pub from: NaiveDate,
    /// Last day of the period, `YYYY-MM-DD`.
    pub to: NaiveDate,
    /// The member who pays.
    pub debtor_id: Uuid,
    /// The member who receives.
    pub creditor_id: Uuid,
    /// Amount as a decimal string, allocated oldest debt first.
    pub amount: String,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
}

/// Request body for generating or confirming a draft batch.
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    /// First day of the period, `YYYY-MM-DD`.
    pub from: NaiveDate,
    /// Last day of the period, `YYYY-MM-DD`.
    pub to: NaiveDate,
    /// Note applied to every generated draft (without the marker).
    #[serde(default)]
    pub note: String,
}

/// Query flag on draft generation.
#[derive(Debug, Deserialize)]
pub struct DraftQuery {
    /// Clear existing drafts for the period before generating.
    #[serde(default)]
    pub replace: bool,
}

/// Creates the settlements router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/households/{household_id}/settlements/summary",
            get(settlement_summary),
        )
        .route(
            "/households/{household_id}/settlements",
            get(list_settlements),
        )
        .route(
            "/households/{household_id}/settlements/split",
            post(settle_split),
        )
        .route(
            "/households/{household_id}/settlements/pair",
            post(settle_pair),
        )
        .route(
            "/households/{household_id}/settlements/items/{item_id}",
            delete(undo_item),
        )
        .route(
            "/households/{household_id}/settlements/{settlement_id}",
            delete(undo_settlement),
        )
        .route(
            "/households/{household_id}/settlements/drafts",
            post(generate_drafts).delete(clear_drafts),
        )
        .route(
            "/households/{household_id}/settlements/drafts/confirm",
            post(confirm_drafts),
        )
}

fn repo_error(e: &SettlementOpError) -> axum::response::Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

fn settlement_json(settlement: &SettlementWithItems) -> serde_json::Value {
    json!({
        "settlement": settlement.header,
        "items": settlement.items,
    })
}

/// GET `/households/{household_id}/settlements/summary?from&to` - Split
/// lines, net balances, suggested transfers, and recorded settlements for
/// the period.
async fn settlement_summary(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    let lines = match repo.split_lines(household_id, period).await {
        Ok(lines) => lines,
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to load split lines");
            return repo_error(&e);
        }
    };
    let settlements = match repo.list_settlements(household_id, Some(period)).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to list settlements");
            return repo_error(&e);
        }
    };

    let balances = net_balances(&lines);
    let suggestions = suggest_transfers(&balances);
    let settlements: Vec<serde_json::Value> = settlements.iter().map(settlement_json).collect();

    (
        StatusCode::OK,
        Json(json!({
            "period": { "from": period.from, "to": period.to },
            "lines": lines,
            "net_balances": balances,
            "suggestions": suggestions,
            "settlements": settlements,
        })),
    )
        .into_response()
}

/// GET `/households/{household_id}/settlements` - List settlements with
/// items, optionally scoped to an exact period.
async fn list_settlements(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<ListSettlementsQuery>,
) -> impl IntoResponse {
    let period = match (query.from, query.to) {
        (Some(from), Some(to)) => match hearthbook_shared::Period::new(from, to) {
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

    let repo = SettlementRepository::new((*state.db).clone());
    match repo.list_settlements(household_id, period).await {
        Ok(settlements) => {
            let body: Vec<serde_json::Value> = settlements.iter().map(settlement_json).collect();
            (StatusCode::OK, Json(json!(body))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to list settlements");
            repo_error(&e)
        }
    }
}

/// Optional exact-period filter on settlement listings.
#[derive(Debug, Deserialize)]
pub struct ListSettlementsQuery {
    /// First day, `YYYY-MM-DD`.
    pub from: Option<NaiveDate>,
    /// Last day, `YYYY-MM-DD`.
    pub to: Option<NaiveDate>,
}

/// POST `/households/{household_id}/settlements/split` - Record a settlement
/// against one split.
async fn settle_split(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(payload): Json<SettleSplitRequest>,
) -> impl IntoResponse {
    let params = PeriodParams {
        from: payload.from,
        to: payload.to,
    };
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };
    let amount = match parse_money(&payload.amount) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo
        .settle_split(household_id, period, payload.split_id, amount, &payload.note)
        .await
    {
        Ok(created) => {
            info!(
                household_id = %household_id,
                settlement_id = %created.header.id,
                split_id = %payload.split_id,
                "Settlement recorded"
            );
            (StatusCode::CREATED, Json(settlement_json(&created))).into_response()
        }
        Err(e) => {
            error!(error = %e, split_id = %payload.split_id, "Failed to settle split");
            repo_error(&e)
        }
    }
}

/// POST `/households/{household_id}/settlements/pair` - Record a settlement
/// between two members, allocated oldest debt first.
async fn settle_pair(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(payload): Json<SettlePairRequest>,
) -> impl IntoResponse {
    let params = PeriodParams {
        from: payload.from,
        to: payload.to,
    };
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };
    let amount = match parse_money(&payload.amount) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo
        .settle_pair(
            household_id,
            period,
            payload.debtor_id,
            payload.creditor_id,
            amount,
            &payload.note,
        )
        .await
    {
        Ok(created) => {
            info!(
                household_id = %household_id,
                settlement_id = %created.header.id,
                items = created.items.len(),
                "Pair settlement recorded"
            );
            (StatusCode::CREATED, Json(settlement_json(&created))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to settle pair");
            repo_error(&e)
        }
    }
}

/// DELETE `/households/{household_id}/settlements/items/{item_id}` - Undo
/// one settlement item.
async fn undo_item(
    State(state): State<AppState>,
    Path((household_id, item_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = SettlementRepository::new((*state.db).clone());
    match repo.undo_item(household_id, item_id).await {
        Ok(()) => {
            info!(household_id = %household_id, item_id = %item_id, "Settlement item undone");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, item_id = %item_id, "Failed to undo settlement item");
            repo_error(&e)
        }
    }
}

/// DELETE `/households/{household_id}/settlements/{settlement_id}` - Undo a
/// settlement with all of its items.
async fn undo_settlement(
    State(state): State<AppState>,
    Path((household_id, settlement_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = SettlementRepository::new((*state.db).clone());
    match repo.undo_header(household_id, settlement_id).await {
        Ok(()) => {
            info!(
                household_id = %household_id,
                settlement_id = %settlement_id,
                "Settlement undone"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, settlement_id = %settlement_id, "Failed to undo settlement");
            repo_error(&e)
        }
    }
}

/// POST `/households/{household_id}/settlements/drafts?replace=` - Generate
/// one draft settlement per debtor/creditor pair.
async fn generate_drafts(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<DraftQuery>,
    Json(payload): Json<DraftRequest>,
) -> impl IntoResponse {
    let params = PeriodParams {
        from: payload.from,
        to: payload.to,
    };
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo
        .generate_drafts(
            household_id,
            period,
            &state.settlement.draft_note_prefix,
            &payload.note,
            query.replace,
        )
        .await
    {
        Ok(drafts) => {
            info!(
                household_id = %household_id,
                drafts = drafts.len(),
                replace = query.replace,
                "Draft settlements generated"
            );
            let body: Vec<serde_json::Value> = drafts.iter().map(settlement_json).collect();
            (StatusCode::CREATED, Json(json!(body))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to generate drafts");
            repo_error(&e)
        }
    }
}

/// POST `/households/{household_id}/settlements/drafts/confirm` - Strip the
/// draft marker from every draft in the period.
async fn confirm_drafts(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(payload): Json<DraftRequest>,
) -> impl IntoResponse {
    let params = PeriodParams {
        from: payload.from,
        to: payload.to,
    };
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo
        .confirm_drafts(household_id, period, &state.settlement.draft_note_prefix)
        .await
    {
        Ok(confirmed) => {
            info!(household_id = %household_id, confirmed, "Drafts confirmed");
            (StatusCode::OK, Json(json!({ "confirmed": confirmed }))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to confirm drafts");
            repo_error(&e)
        }
    }
}

/// DELETE `/households/{household_id}/settlements/drafts?from&to` - Delete
/// every draft in the period.
async fn clear_drafts(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let period = match params.into_period() {
        Ok(p) => p,
        Err(response) => return response,
    };

    let repo = SettlementRepository::new((*state.db).clone());
    match repo
        .clear_drafts(household_id, period, &state.settlement.draft_note_prefix)
        .await
    {
        Ok(cleared) => {
            info!(household_id = %household_id, cleared, "Drafts cleared");
            (StatusCode::OK, Json(json!({ "cleared": cleared }))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to clear drafts");
            repo_error(&e)
        }
    }
}
