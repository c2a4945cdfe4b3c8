//! Society feed: posts, comments and file attachments.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::post::{Attachment, Post};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};
use crate::utils::upload::{self, StoredUpload};

fn multipart_error(err: MultipartError) -> AppError {
    AppError::ValidationError(format!("Invalid multipart payload: {}", err))
}

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_file_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<UploadedFile, AppError> {
    let name = field.file_name().unwrap_or("attachment").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadedFile {
        name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn attachment_from(stored: StoredUpload, now: chrono::DateTime<Utc>) -> Attachment {
    Attachment {
        file_name: stored.file_name,
        file_url: stored.file_url,
        file_type: stored.file_type,
        uploaded_at: now,
    }
}

/// Create a post from a multipart form: `content`, `isAnnouncement`, and an
/// optional `file` attachment.
pub async fn create_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    let now = Utc::now();

    let mut content = String::new();
    let mut is_announcement = false;
    let mut stored: Option<StoredUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "content" => content = field.text().await.map_err(multipart_error)?,
            "isAnnouncement" => {
                is_announcement = field.text().await.map_err(multipart_error)? == "true";
            }
            "file" => {
                let file = read_file_field(field).await?;
                stored = Some(
                    upload::store(
                        &state.config.upload_dir,
                        &file.name,
                        &file.content_type,
                        &file.bytes,
                        now,
                    )
                    .await?,
                );
            }
            _ => {}
        }
    }

    if content.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Field 'content' is required".to_string(),
        ));
    }

    let mut post = Post::new(content, is_announcement, now);
    if let Some(stored) = stored {
        post.attachments.push(attachment_from(stored, now));
    }

    society.doc.posts.push(post);
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Post created"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPostRequest {
    pub content: String,
    pub edited_by: Option<String>,
}

pub async fn edit_post(
    State(state): State<AppState>,
    Path((id, post_index)): Path<(Uuid, usize)>,
    Json(request): Json<EditPostRequest>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;

    let post = society.doc.post_mut(post_index)?;
    post.content = request.content;
    post.last_edited = Utc::now();
    post.edited_by = request.edited_by;
    let updated = post.clone();

    state.db.update_society(&society).await?;
    Ok(success(updated, "Post updated"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path((id, post_index)): Path<(Uuid, usize)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;

    society.doc.post(post_index)?;
    society.doc.posts.remove(post_index);
    state.db.update_society(&society).await?;

    Ok(empty_success("Post deleted successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((id, post_index, comment_index)): Path<(Uuid, usize, usize)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;

    let post = society.doc.post_mut(post_index)?;
    if comment_index >= post.comments.len() {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    post.comments.remove(comment_index);
    let updated = post.clone();

    state.db.update_society(&society).await?;
    Ok(success(updated, "Comment deleted"))
}

/// Attach a file to an existing post; the multipart form must carry a
/// `file` field.
pub async fn add_attachment(
    State(state): State<AppState>,
    Path((id, post_index)): Path<(Uuid, usize)>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.post(post_index)?;
    let now = Utc::now();

    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = Some(read_file_field(field).await?);
        }
    }

    let Some(file) = file else {
        return Err(AppError::ValidationError("No file uploaded".to_string()));
    };

    let stored = upload::store(
        &state.config.upload_dir,
        &file.name,
        &file.content_type,
        &file.bytes,
        now,
    )
    .await?;

    let post = society.doc.post_mut(post_index)?;
    post.attachments.push(attachment_from(stored, now));
    let updated = post.clone();

    state.db.update_society(&society).await?;
    Ok(success(updated, "Attachment uploaded"))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, post_index, attachment_index)): Path<(Uuid, usize, usize)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;

    let post = society.doc.post_mut(post_index)?;
    if attachment_index >= post.attachments.len() {
        return Err(AppError::NotFound("Attachment not found".to_string()));
    }
    let attachment = post.attachments.remove(attachment_index);

    state.db.update_society(&society).await?;
    upload::remove_by_url(&state.config.upload_dir, &attachment.file_url).await;

    Ok(empty_success("Attachment deleted successfully"))
}
