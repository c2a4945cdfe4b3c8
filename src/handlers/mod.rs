use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod admin;
pub mod announcements;
pub mod auth;
pub mod events;
pub mod posts;
pub mod societies;
pub mod students;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "society-portal-api",
    };

    success(payload, "Health check successful")
}
