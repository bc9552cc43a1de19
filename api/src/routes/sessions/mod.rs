//! Route group for `/api/courses/{course_id}/attendance/sessions`.
//!
//! Issues, lists and reads the rotating QR session for a course. Every
//! route is staff-only and runs behind `validate_course_id`, so handlers
//! can assume the course exists.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::{current_session, list_sessions};
pub use post::create_session;

use crate::auth::guards::{require_staff, validate_course_id};

pub fn sessions_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/current", get(current_session))
        .route_layer(from_fn_with_state(app_state.clone(), require_staff))
        .route_layer(from_fn_with_state(app_state.clone(), validate_course_id))
        .with_state(app_state)
}
