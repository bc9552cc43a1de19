use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Default)]
pub struct SessionResponse {
    pub id: i64,
    pub course_id: String,
    pub created_by: String,
    pub token: String,
    pub active: bool,
    pub created_at: String,
    pub expires_at: String,
}

impl From<db::models::attendance_session::Model> for SessionResponse {
    fn from(m: db::models::attendance_session::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id.to_string(),
            created_by: m.created_by.to_string(),
            token: m.token,
            active: m.active,
            created_at: m.created_at.to_rfc3339(),
            expires_at: m.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub active: Option<bool>, // filter by current status
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub sessions: Vec<SessionResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}

#[derive(Deserialize)]
pub struct CreateSessionReq {
    /// How long the issued code stays scannable, in hours. Falls back to
    /// the configured default when omitted.
    pub validity_hours: Option<i64>,
}
