use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::user::UserKind;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Name-plus-dashboard login, exactly as trusting as the original portal.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .db
        .user_by_name_and_kind(&request.name, request.kind)
        .await?;

    Ok(success(user.doc, "Login successful"))
}
