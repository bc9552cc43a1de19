//! Route group for `/api/attendance`.
//!
//! `/scan` accepts any of the three QR token kinds and is open to every
//! active account; person tokens additionally need a registrar role,
//! checked in the handler. `/records` is the manual entry and listing
//! surface for registrars.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::list_records;
pub use post::{create_record, scan};

use crate::auth::guards::{allow_authenticated, require_registrar};

pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/scan",
            post(scan).route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .route(
            "/records",
            post(create_record)
                .route_layer(from_fn_with_state(app_state.clone(), require_registrar)),
        )
        .route(
            "/records",
            get(list_records)
                .route_layer(from_fn_with_state(app_state.clone(), require_registrar)),
        )
        .with_state(app_state)
}
