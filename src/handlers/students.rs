//! Student dashboard: membership applications and member-gated commenting.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::post::Comment;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn applications(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let student = state.db.student(&name).await?;
    Ok(success(student.doc.applications, "Applications retrieved"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub society_id: Uuid,
}

pub async fn apply(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> Result<Response, AppError> {
    let mut student = state.db.student(&name).await?;
    let society = state.db.society(request.society_id).await?;

    student.doc.apply_to(&society.doc.name)?;
    state.db.update_user(&student).await?;

    Ok(success(student.doc.applications, "Application submitted"))
}

#[derive(Deserialize)]
pub struct PostCommentRequest {
    pub content: String,
}

/// Comment on a society post; only members may.
pub async fn comment_on_post(
    State(state): State<AppState>,
    Path((name, society_id, post_index)): Path<(String, Uuid, usize)>,
    Json(request): Json<PostCommentRequest>,
) -> Result<Response, AppError> {
    let student = state.db.student(&name).await?;
    let mut society = state.db.society(society_id).await?;

    if !society.doc.is_member(&student.doc.name) {
        return Err(AppError::Forbidden(
            "You must be a member to comment".to_string(),
        ));
    }

    let post = society.doc.post_mut(post_index)?;
    post.comments.push(Comment {
        author: student.doc.name.clone(),
        content: request.content,
        created_at: Utc::now(),
    });
    let updated = post.clone();

    state.db.update_society(&society).await?;
    Ok(success(updated, "Comment added"))
}
