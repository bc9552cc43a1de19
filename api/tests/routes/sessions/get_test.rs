#[cfg(test)]
mod tests {
    use api::auth::generate_jwt;
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::Duration;
    use serde_json::Value;
    use tower::ServiceExt;

    use db::models::attendance_session::{Entity as SessionEntity, Model as SessionModel};
    use db::models::{course::Model as CourseModel, user::Model as UserModel, user::Role};
    use db::test_utils::{seed_course, seed_person};
    use sea_orm::EntityTrait;

    use crate::helpers::app::make_test_app;

    struct TestCtx {
        teacher: UserModel,
        student: UserModel,
        course: CourseModel,
    }

    async fn setup(db: &sea_orm::DatabaseConnection) -> TestCtx {
        let teacher = seed_person(db, "Dr. Naidoo", Role::Teacher).await;
        let student = seed_person(db, "Lerato", Role::Student).await;
        let course = seed_course(db, "Databases").await;
        TestCtx {
            teacher,
            student,
            course,
        }
    }

    fn get_req(uri: String, token: &str) -> Request<AxumBody> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(AxumBody::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn list_sessions_is_newest_first_and_paginated() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;
        let db = app_state.db();

        let _first = SessionModel::issue(db, ctx.course.id, ctx.teacher.id, Duration::hours(24))
            .await
            .unwrap();
        let _second = SessionModel::issue(db, ctx.course.id, ctx.teacher.id, Duration::hours(24))
            .await
            .unwrap();
        let third = SessionModel::issue(db, ctx.course.id, ctx.teacher.id, Duration::hours(24))
            .await
            .unwrap();

        let (token, _) = generate_jwt(ctx.teacher.id);
        let uri = format!(
            "/api/courses/{}/attendance/sessions?page=1&per_page=2",
            ctx.course.id
        );

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["total"], 3);
        assert_eq!(json["data"]["per_page"], 2);

        let sessions = json["data"]["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0]["id"].as_i64().unwrap(), third.id);
    }

    #[tokio::test]
    async fn list_sessions_active_filter_narrows_to_the_live_one() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;
        let db = app_state.db();

        SessionModel::issue(db, ctx.course.id, ctx.teacher.id, Duration::hours(24))
            .await
            .unwrap();
        let latest = SessionModel::issue(db, ctx.course.id, ctx.teacher.id, Duration::hours(24))
            .await
            .unwrap();

        let (token, _) = generate_jwt(ctx.teacher.id);
        let uri = format!(
            "/api/courses/{}/attendance/sessions?active=true",
            ctx.course.id
        );

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let sessions = json["data"]["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["id"].as_i64().unwrap(), latest.id);
    }

    #[tokio::test]
    async fn current_session_returns_the_live_token() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let issued = SessionModel::issue(
            app_state.db(),
            ctx.course.id,
            ctx.teacher.id,
            Duration::hours(24),
        )
        .await
        .unwrap();

        let (token, _) = generate_jwt(ctx.teacher.id);
        let uri = format!(
            "/api/courses/{}/attendance/sessions/current",
            ctx.course.id
        );

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["token"], issued.token);
    }

    #[tokio::test]
    async fn current_session_is_404_when_nothing_is_live() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let uri = format!(
            "/api/courses/{}/attendance/sessions/current",
            ctx.course.id
        );

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "No active session for this course");
    }

    #[tokio::test]
    async fn current_session_retires_an_expired_row() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        // Already past its expiry, but the flag was never flipped.
        let stale = SessionModel::issue(
            app_state.db(),
            ctx.course.id,
            ctx.teacher.id,
            Duration::hours(-1),
        )
        .await
        .unwrap();
        assert!(stale.active);

        let (token, _) = generate_jwt(ctx.teacher.id);
        let uri = format!(
            "/api/courses/{}/attendance/sessions/current",
            ctx.course.id
        );

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let row = SessionEntity::find_by_id(stale.id)
            .one(app_state.db())
            .await
            .unwrap()
            .unwrap();
        assert!(!row.active);
    }

    #[tokio::test]
    async fn list_sessions_forbidden_for_student() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.student.id);
        let uri = format!("/api/courses/{}/attendance/sessions", ctx.course.id);

        let resp = app.oneshot(get_req(uri, &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
