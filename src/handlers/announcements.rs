//! Scheduled announcements. Creation never talks to the sweeper; the
//! upcoming view is exactly the set the sweeper has not touched yet.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::post::Post;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub content: String,
    pub scheduled_for: DateTime<Utc>,
}

pub async fn schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Response, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Field 'content' is required".to_string(),
        ));
    }

    let mut society = state.db.society(id).await?;
    society.doc.posts.push(Post::scheduled(
        request.content,
        request.scheduled_for,
        Utc::now(),
    ));
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Announcement scheduled"))
}

pub async fn upcoming(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let society = state.db.society(id).await?;
    let upcoming = society.doc.upcoming_announcements(Utc::now());

    Ok(success(upcoming, "Upcoming announcements retrieved"))
}
