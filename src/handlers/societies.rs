//! Society dashboard: registration, membership applications, roles and the
//! member audit trail.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::seed;
use crate::models::society::{HistoryAction, Society, SocietyDraft};
use crate::models::user::{ApplicationStatus, User, UserKind};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// Register a new society and its matching login user. The society starts
/// unapproved, with a copy of the shared venue list.
pub async fn register(
    State(state): State<AppState>,
    Json(draft): Json<SocietyDraft>,
) -> Result<Response, AppError> {
    let society = Society::register(draft, seed::default_venues())?;
    state.db.insert_society(&society).await?;
    state
        .db
        .insert_user(&User::new(society.name.clone(), UserKind::Society))
        .await?;

    Ok(created(society, "Society registered"))
}

pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let society = state.db.society_by_name(&name).await?;
    Ok(success(society.doc, "Society retrieved"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingApplication {
    student_name: String,
    society_name: String,
}

/// Students with an open application to this society, joined from the user
/// collection.
pub async fn applications(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let society = state.db.society_by_name(&name).await?;

    let applications: Vec<_> = state
        .db
        .students()
        .await?
        .into_iter()
        .filter(|student| {
            student
                .doc
                .application_for(&society.doc.name)
                .map_or(false, |application| {
                    application.status == ApplicationStatus::Requested
                })
        })
        .map(|student| PendingApplication {
            student_name: student.doc.name,
            society_name: society.doc.name.clone(),
        })
        .collect();

    Ok(success(applications, "Applications retrieved"))
}

pub async fn approve_application(
    State(state): State<AppState>,
    Path((id, student_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.admit_member(&student_name, Utc::now());
    state.db.update_society(&society).await?;

    // A student record may be missing for manually admitted members; the
    // membership itself still stands.
    if let Ok(mut student) = state.db.student(&student_name).await {
        student
            .doc
            .set_application_status(&society.doc.name, ApplicationStatus::Accepted);
        state.db.update_user(&student).await?;
    }

    Ok(success(society.doc, "Application approved"))
}

pub async fn reject_application(
    State(state): State<AppState>,
    Path((id, student_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let society = state.db.society(id).await?;

    if let Ok(mut student) = state.db.student(&student_name).await {
        student
            .doc
            .set_application_status(&society.doc.name, ApplicationStatus::Rejected);
        state.db.update_user(&student).await?;
    }

    Ok(empty_success("Application rejected"))
}

#[derive(Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

pub async fn assign_role(
    State(state): State<AppState>,
    Path((id, member_name)): Path<(Uuid, String)>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Response, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Field 'role' is required".to_string(),
        ));
    }

    let mut society = state.db.society(id).await?;
    society
        .doc
        .assign_role(&member_name, &request.role, Utc::now())?;
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Role assigned"))
}

pub async fn remove_role(
    State(state): State<AppState>,
    Path((id, member_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.remove_role(&member_name);
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Role removed"))
}

pub async fn member_history(
    State(state): State<AppState>,
    Path((id, member_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let society = state.db.society(id).await?;
    let history = society.doc.history_for(&member_name);

    Ok(success(history, "Member history retrieved"))
}

#[derive(Deserialize)]
pub struct HistoryEntryRequest {
    pub action: HistoryAction,
    pub details: String,
}

pub async fn add_member_history(
    State(state): State<AppState>,
    Path((id, member_name)): Path<(Uuid, String)>,
    Json(request): Json<HistoryEntryRequest>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society
        .doc
        .record_history(&member_name, request.action, request.details, Utc::now());
    state.db.update_society(&society).await?;

    Ok(success(society.doc.member_history, "History entry added"))
}

/// A member leaves: membership, roles and their application all go; the
/// audit trail keeps the record.
pub async fn leave(
    State(state): State<AppState>,
    Path((id, student_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.remove_member(&student_name, Utc::now());
    state.db.update_society(&society).await?;

    if let Ok(mut student) = state.db.student(&student_name).await {
        student.doc.withdraw_application(&society.doc.name);
        state.db.update_user(&student).await?;
    }

    Ok(empty_success("Successfully left the society"))
}
