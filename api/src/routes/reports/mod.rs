//! Route group for `/api/reports`. Read-only aggregates over the
//! attendance register, staff only.

use axum::{Router, middleware::from_fn_with_state, routing::get};
use util::state::AppState;

mod get;

pub use get::{daily_report, status_report};

use crate::auth::guards::require_staff;

pub fn reports_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/attendance/status", get(status_report))
        .route("/attendance/daily", get(daily_report))
        .route_layer(from_fn_with_state(app_state.clone(), require_staff))
        .with_state(app_state)
}
