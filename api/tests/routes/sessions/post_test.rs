#[cfg(test)]
mod tests {
    use api::auth::generate_jwt;
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::{DateTime, Duration};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use db::models::attendance_session::{Column as SessionCol, Entity as SessionEntity};
    use db::models::{course::Model as CourseModel, user::Model as UserModel, user::Role};
    use db::test_utils::{seed_course, seed_person};
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

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

    fn create_req(course_id: &str, token: &str, body: Value) -> Request<AxumBody> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/courses/{course_id}/attendance/sessions"))
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body(AxumBody::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_session_as_teacher_returns_the_token() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let req = create_req(&ctx.course.id.to_string(), &token, serde_json::json!({}));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Attendance session created");
        assert_eq!(json["data"]["active"], true);
        assert_eq!(json["data"]["course_id"], ctx.course.id.to_string());
        assert_eq!(json["data"]["created_by"], ctx.teacher.id.to_string());
        assert!(
            json["data"]["token"]
                .as_str()
                .unwrap()
                .starts_with("curso:")
        );
    }

    #[tokio::test]
    async fn create_session_honours_custom_validity() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let req = create_req(
            &ctx.course.id.to_string(),
            &token,
            serde_json::json!({ "validity_hours": 2 }),
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        let created_at =
            DateTime::parse_from_rfc3339(json["data"]["created_at"].as_str().unwrap()).unwrap();
        let expires_at =
            DateTime::parse_from_rfc3339(json["data"]["expires_at"].as_str().unwrap()).unwrap();
        assert_eq!(expires_at - created_at, Duration::hours(2));
    }

    #[tokio::test]
    async fn create_session_defaults_to_the_configured_validity() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let req = create_req(&ctx.course.id.to_string(), &token, serde_json::json!({}));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        // `make_test_app` pins the configured validity to 24 hours.
        let created_at =
            DateTime::parse_from_rfc3339(json["data"]["created_at"].as_str().unwrap()).unwrap();
        let expires_at =
            DateTime::parse_from_rfc3339(json["data"]["expires_at"].as_str().unwrap()).unwrap();
        assert_eq!(expires_at - created_at, Duration::hours(24));
    }

    #[tokio::test]
    async fn create_session_retires_the_previous_one() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let course_id = ctx.course.id.to_string();

        let first = app
            .clone()
            .oneshot(create_req(&course_id, &token, serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(create_req(&course_id, &token, serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let second_token = json["data"]["token"].as_str().unwrap().to_string();

        let active = SessionEntity::find()
            .filter(SessionCol::CourseId.eq(ctx.course.id))
            .filter(SessionCol::Active.eq(true))
            .all(app_state.db())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, second_token);
    }

    #[tokio::test]
    async fn create_session_forbidden_for_student() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.student.id);
        let req = create_req(&ctx.course.id.to_string(), &token, serde_json::json!({}));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Staff access required");
    }

    #[tokio::test]
    async fn create_session_requires_authentication() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let req = Request::builder()
            .method("POST")
            .uri(format!(
                "/api/courses/{}/attendance/sessions",
                ctx.course.id
            ))
            .header("Content-Type", "application/json")
            .body(AxumBody::from("{}"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_session_unknown_course_is_404() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let ghost = Uuid::new_v4();
        let req = create_req(&ghost.to_string(), &token, serde_json::json!({}));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn create_session_rejects_malformed_course_id() {
        let (app, app_state) = make_test_app().await;
        let ctx = setup(app_state.db()).await;

        let (token, _) = generate_jwt(ctx.teacher.id);
        let req = create_req("not-a-uuid", &token, serde_json::json!({}));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["message"].as_str().unwrap().contains("Must be a UUID"));
    }
}
