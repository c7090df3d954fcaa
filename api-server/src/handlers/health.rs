//! Health check and welcome handlers

use axum::Json;
use serde::Serialize;

const WELCOME: &str = "Student Performance Analytics API\n\
\n\
GET  /summary        predicted performance distribution\n\
GET  /at-risk        students predicted Low\n\
GET  /students       all students with predictions\n\
GET  /students/:id   one student\n\
GET  /rules          association rules (?round=N)\n\
POST /upload         replace the student table (multipart field `file`)\n";

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

pub async fn welcome() -> &'static str {
    WELCOME
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
