//! Event booking and event-side reads for the society dashboard.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::event::EventDraft;
use crate::models::post::Comment;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Book a venue slot for a new event. Fails with 404 for an unknown venue
/// and 400 when the slot collides with an approved reservation; on success
/// the pending event and its reservation land in one society write.
pub async fn book_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.book_event(draft, Utc::now())?;
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Event booked"))
}

#[derive(Deserialize)]
pub struct EventCommentRequest {
    pub author: String,
    pub content: String,
}

pub async fn add_event_comment(
    State(state): State<AppState>,
    Path((id, event_index)): Path<(Uuid, usize)>,
    Json(request): Json<EventCommentRequest>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;

    let event = society.doc.event_mut(event_index)?;
    event.comments.push(Comment {
        author: request.author,
        content: request.content,
        created_at: Utc::now(),
    });
    let updated = event.clone();

    state.db.update_society(&society).await?;
    Ok(success(updated, "Comment added"))
}

/// Approved events happening today or tomorrow.
pub async fn reminders(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let society = state.db.society(id).await?;
    let reminders = society.doc.event_reminders(Utc::now());

    Ok(success(reminders, "Event reminders retrieved"))
}
