#[cfg(test)]
mod tests {
    use api::auth::generate_jwt;
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::{NaiveDate, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use db::models::attendance_record::{AttendanceStatus, Model as Record};
    use db::models::user::{Model as UserModel, Role};
    use db::test_utils::seed_person;

    use crate::helpers::app::make_test_app;

    fn get_req(path: &str, jwt: &str) -> Request<AxumBody> {
        Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {jwt}"))
            .body(AxumBody::empty())
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    async fn mark(
        db: &sea_orm::DatabaseConnection,
        person: &UserModel,
        date: NaiveDate,
        status: AttendanceStatus,
    ) {
        Record::override_status(db, person, date, Utc::now(), status, person.id, None)
            .await
            .unwrap();
    }

    fn bucket<'a>(report: &'a Value, status: &str) -> &'a Value {
        report["by_status"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["status"] == status)
            .expect("every status is present")
    }

    #[tokio::test]
    async fn status_report_counts_and_percentages() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = seed_person(db, "Dr. Naidoo", Role::Teacher).await;
        let a = seed_person(db, "A", Role::Student).await;
        let b = seed_person(db, "B", Role::Student).await;
        let c = seed_person(db, "C", Role::Student).await;

        mark(db, &a, day(1), AttendanceStatus::Present).await;
        mark(db, &b, day(1), AttendanceStatus::Present).await;
        mark(db, &c, day(1), AttendanceStatus::Late).await;

        let (jwt, _) = generate_jwt(teacher.id);
        let resp = app
            .oneshot(get_req(
                "/api/reports/attendance/status?from=2026-04-01&to=2026-04-30",
                &jwt,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["message"], "Attendance status report");
        let report = &json["data"];
        assert_eq!(report["total"], 3);
        assert_eq!(report["by_status"].as_array().unwrap().len(), 4);
        assert_eq!(bucket(report, "present")["count"], 2);
        assert_eq!(bucket(report, "present")["percent"], 67);
        assert_eq!(bucket(report, "late")["percent"], 33);
        assert_eq!(bucket(report, "absent")["count"], 0);
        assert_eq!(bucket(report, "excused")["percent"], 0);
    }

    #[tokio::test]
    async fn status_report_empty_range_is_all_zeros() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = seed_person(db, "Dr. Naidoo", Role::Teacher).await;
        let a = seed_person(db, "A", Role::Student).await;
        mark(db, &a, day(10), AttendanceStatus::Present).await;

        let (jwt, _) = generate_jwt(teacher.id);
        let resp = app
            .oneshot(get_req(
                "/api/reports/attendance/status?from=2026-05-01&to=2026-05-05",
                &jwt,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["data"]["total"], 0);
        for b in json["data"]["by_status"].as_array().unwrap() {
            assert_eq!(b["count"], 0);
            assert_eq!(b["percent"], 0);
        }
    }

    #[tokio::test]
    async fn status_report_role_filter_narrows_the_population() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = seed_person(db, "Dr. Naidoo", Role::Teacher).await;
        let student = seed_person(db, "Lerato", Role::Student).await;

        mark(db, &student, day(2), AttendanceStatus::Present).await;
        mark(db, &teacher, day(2), AttendanceStatus::Absent).await;

        let (jwt, _) = generate_jwt(teacher.id);
        let resp = app
            .oneshot(get_req(
                "/api/reports/attendance/status?from=2026-04-01&to=2026-04-30&role=student",
                &jwt,
            ))
            .await
            .unwrap();
        let json = json_body(resp).await;
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(bucket(&json["data"], "present")["count"], 1);
        assert_eq!(bucket(&json["data"], "absent")["count"], 0);
    }

    #[tokio::test]
    async fn unknown_role_filter_is_a_bad_request() {
        let (app, app_state) = make_test_app().await;
        let teacher = seed_person(app_state.db(), "Dr. Naidoo", Role::Teacher).await;

        let (jwt, _) = generate_jwt(teacher.id);
        let resp = app
            .oneshot(get_req("/api/reports/attendance/status?role=wizard", &jwt))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = json_body(resp).await;
        assert_eq!(json["message"], "Unknown role filter: 'wizard'");
    }

    #[tokio::test]
    async fn daily_report_is_ascending_and_sparse() {
        let (app, app_state) = make_test_app().await;
        let db = app_state.db();
        let teacher = seed_person(db, "Dr. Naidoo", Role::Teacher).await;
        let a = seed_person(db, "A", Role::Student).await;
        let b = seed_person(db, "B", Role::Student).await;

        // Out-of-order writes; nothing on the days in between.
        mark(db, &a, day(9), AttendanceStatus::Present).await;
        mark(db, &a, day(3), AttendanceStatus::Present).await;
        mark(db, &b, day(3), AttendanceStatus::Excused).await;
        mark(db, &a, day(6), AttendanceStatus::Late).await;

        let (jwt, _) = generate_jwt(teacher.id);
        let resp = app
            .oneshot(get_req(
                "/api/reports/attendance/daily?from=2026-04-01&to=2026-04-30",
                &jwt,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["message"], "Attendance daily report");
        let days = json["data"].as_array().unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0]["date"], "2026-04-03");
        assert_eq!(days[1]["date"], "2026-04-06");
        assert_eq!(days[2]["date"], "2026-04-09");
        assert_eq!(days[0]["total"], 2);
        assert_eq!(days[1]["total"], 1);
    }

    #[tokio::test]
    async fn reports_are_staff_only() {
        let (app, app_state) = make_test_app().await;
        let student = seed_person(app_state.db(), "Lerato", Role::Student).await;

        let (jwt, _) = generate_jwt(student.id);
        let resp = app
            .clone()
            .oneshot(get_req("/api/reports/attendance/status", &jwt))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let json = json_body(resp).await;
        assert_eq!(json["message"], "Staff access required");

        let resp = app
            .oneshot(get_req("/api/reports/attendance/daily", &jwt))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reports_require_authentication() {
        let (app, _app_state) = make_test_app().await;

        let req = Request::builder()
            .method("GET")
            .uri("/api/reports/attendance/status")
            .body(AxumBody::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
