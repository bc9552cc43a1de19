use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{course, user};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use util::state::AppState;
use uuid::Uuid;

// --- Role Based Access Guards ---

#[derive(serde::Serialize, Default)]
pub struct Empty;

/// The caller's freshly loaded row, inserted by the guards so handlers
/// never have to resolve the JWT subject themselves.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

type GuardError = (StatusCode, Json<ApiResponse<Empty>>);

/// Helper to extract, validate user from request extensions and insert them back into the request
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Authentication required")),
            )
        })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Re-reads the caller's row so role and active flag are always current,
/// not whatever they were when the token was minted. Deny on storage
/// error (fail-safe).
async fn load_current_user(
    db: &DatabaseConnection,
    person_id: Uuid,
) -> Result<user::Model, GuardError> {
    match user::Model::find_by_id(db, person_id).await {
        Ok(Some(person)) if person.active => Ok(person),
        Ok(Some(_)) => Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Account is inactive")),
        )),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Unknown account")),
        )),
        Err(e) => {
            tracing::warn!(
                error = %e,
                person_id = %person_id,
                "DB error while loading caller; denying access"
            );
            Err((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error("Access denied")),
            ))
        }
    }
}

/// Shared body of the role guards: authenticate, re-read the caller,
/// apply the role predicate, then stash the row for the handler.
async fn allow_role_base(
    app_state: AppState,
    req: Request<Body>,
    next: Next,
    permitted: fn(user::Role) -> bool,
    failure_msg: &str,
) -> Result<Response, GuardError> {
    let (mut req, user) = extract_and_insert_authuser(req).await?;
    let current = load_current_user(app_state.db(), user.0.sub).await?;

    if !permitted(current.role) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error(failure_msg)),
        ));
    }

    req.extensions_mut().insert(CurrentUser(current));
    Ok(next.run(req).await)
}

/// Basic guard to ensure the request comes from an active, known account.
pub async fn allow_authenticated(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    allow_role_base(app_state, req, next, |_| true, "Access denied").await
}

/// Admin-only guard.
pub async fn allow_admin(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    allow_role_base(
        app_state,
        req,
        next,
        |role| role == user::Role::Admin,
        "Admin access required",
    )
    .await
}

/// Staff guard: admins and teachers. Issuing session codes and reading
/// reports live behind this.
pub async fn require_staff(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    allow_role_base(
        app_state,
        req,
        next,
        |role| role.is_staff(),
        "Staff access required",
    )
    .await
}

/// Registrar guard: admins, teachers and monitors. Anyone allowed to
/// record attendance on someone else's behalf.
pub async fn require_registrar(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    allow_role_base(
        app_state,
        req,
        next,
        |role| role.is_registrar(),
        "Registrar access required",
    )
    .await
}

// --- Path Validation ---

/// Rejects requests whose `course_id` path segment is not a UUID or does
/// not name a stored course, before any handler runs.
pub async fn validate_course_id(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let raw = params.get("course_id").ok_or((
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error("Missing course_id")),
    ))?;

    let course_id = Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Empty>::error(format!(
                "Invalid course_id: '{raw}'. Must be a UUID."
            ))),
        )
    })?;

    let found = course::Model::find_by_id(app_state.db(), course_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, course_id = %course_id, "DB error while checking course");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error while checking course")),
            )
        })?;

    if found.is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error(format!(
                "Course {course_id} not found."
            ))),
        ));
    }

    Ok(next.run(req).await)
}
