//! HTTP route entry point for `/api/...`.
//!
//! This module defines all HTTP entry points under the `/api` namespace.
//! Routes are organized by domain (health, session issuing, attendance
//! recording, reports), each protected via appropriate access control
//! middleware.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/courses/{course_id}/attendance/sessions` → QR session issuing (staff only)
//! - `/attendance` → Scan and manual attendance recording (authenticated)
//! - `/reports` → Aggregated attendance reports (staff only)

use crate::routes::{
    attendance::attendance_routes, health::health_routes, reports::reports_routes,
    sessions::sessions_routes,
};
use axum::Router;
use util::state::AppState;

pub mod attendance;
pub mod health;
pub mod reports;
pub mod sessions;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has `AppState` as its state type and mounts
/// all core API routes under their respective base paths.
///
/// # Route Structure:
/// - `/health` → Health check endpoint (no authentication required).
/// - `/courses/{course_id}/attendance/sessions` → Issue, list and read the
///   current rotating QR session for a course (staff only; the `course_id`
///   path segment is validated before any handler runs).
/// - `/attendance/scan` → Record a scan for any token kind (any active account;
///   person tokens scanned on someone's behalf additionally need a registrar role).
/// - `/attendance/records` → Manual record entry and listing (registrar only).
/// - `/reports/attendance/...` → Status and per-day aggregates (staff only).
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/courses/{course_id}/attendance/sessions",
            sessions_routes(app_state.clone()),
        )
        .nest("/attendance", attendance_routes(app_state.clone()))
        .nest("/reports", reports_routes(app_state.clone()))
        .with_state(app_state)
}
