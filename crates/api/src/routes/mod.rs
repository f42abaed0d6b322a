//! API route definitions.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use hearthbook_core::money::parse_amount;
use hearthbook_shared::{Period, PeriodError};

use crate::AppState;

pub mod expenses;
pub mod health;
pub mod households;
pub mod settlements;

/// Creates the API router with all routes.
pub fn api_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(health::routes())
        .merge(households::routes())
        .merge(expenses::routes())
        .merge(settlements::routes())
}

/// Inclusive date range as it appears in queries and bodies.
#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    /// First day, `YYYY-MM-DD`.
    pub from: chrono::NaiveDate,
    /// Last day, `YYYY-MM-DD`.
    pub to: chrono::NaiveDate,
}

impl PeriodParams {
    /// Validates the range, mapping an inverted one to a 400 response.
    pub fn into_period(self) -> Result<Period, Response> {
        Period::new(self.from, self.to).map_err(|e: PeriodError| {
            error_response(400, "INVALID_PERIOD", &e.to_string())
        })
    }
}

/// Parses a monetary amount from a request body, mapping garbage to a 400
/// response instead of coercing it.
pub(crate) fn parse_money(s: &str) -> Result<rust_decimal::Decimal, Response> {
    parse_amount(s).ok_or_else(|| {
        error_response(400, "INVALID_AMOUNT", &format!("Not a valid amount: {s:?}"))
    })
}

/// Builds the uniform error body used by every handler.
pub(crate) fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}
