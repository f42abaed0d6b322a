//! Household and member routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use hearthbook_db::HouseholdRepository;
use hearthbook_db::repositories::household::HouseholdError;

use super::error_response;
use crate::AppState;

/// Request body for creating a household or adding a member.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    /// Display name.
    pub name: String,
}

/// Creates the households router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/households", post(create_household))
        .route("/households/{household_id}", get(get_household))
        .route("/households/{household_id}/members", post(add_member))
        .route("/households/{household_id}/members", get(list_members))
}

fn repo_error(e: &HouseholdError) -> axum::response::Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

/// POST /households - Create a new household.
async fn create_household(
    State(state): State<AppState>,
    Json(payload): Json<NameRequest>,
) -> impl IntoResponse {
    let repo = HouseholdRepository::new((*state.db).clone());
    match repo.create(&payload.name).await {
        Ok(household) => {
            info!(household_id = %household.id, "Household created");
            (StatusCode::CREATED, Json(json!(household))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create household");
            repo_error(&e)
        }
    }
}

/// GET `/households/{household_id}` - Get household details.
async fn get_household(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = HouseholdRepository::new((*state.db).clone());
    match repo.find_by_id(household_id).await {
        Ok(Some(household)) => (StatusCode::OK, Json(json!(household))).into_response(),
        Ok(None) => error_response(404, "HOUSEHOLD_NOT_FOUND", "Household not found"),
        Err(e) => {
            error!(error = %e, "Failed to load household");
            repo_error(&e)
        }
    }
}

/// POST `/households/{household_id}/members` - Add a member.
async fn add_member(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(payload): Json<NameRequest>,
) -> impl IntoResponse {
    let repo = HouseholdRepository::new((*state.db).clone());
    match repo.add_member(household_id, &payload.name).await {
        Ok(member) => {
            info!(household_id = %household_id, member_id = %member.id, "Member added");
            (StatusCode::CREATED, Json(json!(member))).into_response()
        }
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to add member");
            repo_error(&e)
        }
    }
}

/// GET `/households/{household_id}/members` - List members.
async fn list_members(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = HouseholdRepository::new((*state.db).clone());
    match repo.list_members(household_id).await {
        Ok(members) => (StatusCode::OK, Json(json!(members))).into_response(),
        Err(e) => {
            error!(error = %e, household_id = %household_id, "Failed to list members");
            repo_error(&e)
        }
    }
}
