//! Admin dashboard: society approval, the shared venue list, and event
//! moderation across every society.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::{ApprovalStatus, Event, EventAction, Venue};
use crate::models::post::Post;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

pub async fn list_societies(State(state): State<AppState>) -> Result<Response, AppError> {
    let societies: Vec<_> = state
        .db
        .list_societies()
        .await?
        .into_iter()
        .map(|persisted| persisted.doc)
        .collect();

    Ok(success(societies, "Societies retrieved"))
}

pub async fn approve_society(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.is_approved = true;
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Society approved"))
}

pub async fn delete_society(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.db.delete_society(id).await?;
    Ok(empty_success("Society deleted successfully"))
}

#[derive(Deserialize)]
pub struct ReplacePostsRequest {
    pub posts: Vec<Post>,
}

/// Wholesale replacement of a society's post list.
pub async fn replace_posts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReplacePostsRequest>,
) -> Result<Response, AppError> {
    let mut society = state.db.society(id).await?;
    society.doc.posts = request.posts;
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Posts updated"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VenueSummary {
    name: String,
    capacity: u32,
    location: String,
    is_available: bool,
}

/// The shared venue list, deduplicated by name across societies.
pub async fn list_venues(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut venues: Vec<VenueSummary> = Vec::new();
    for persisted in state.db.list_societies().await? {
        for venue in &persisted.doc.venues {
            if venues.iter().all(|seen| seen.name != venue.name) {
                venues.push(VenueSummary {
                    name: venue.name.clone(),
                    capacity: venue.capacity,
                    location: venue.location.clone(),
                    is_available: venue.is_available,
                });
            }
        }
    }

    Ok(success(venues, "Venues retrieved"))
}

#[derive(Deserialize)]
pub struct NewVenueRequest {
    pub name: String,
    pub capacity: u32,
    pub location: String,
}

/// Add a venue to every society's list. Societies that already have a venue
/// with that name keep their copy (and its reservations).
pub async fn add_venue(
    State(state): State<AppState>,
    Json(request): Json<NewVenueRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() || request.location.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Fields 'name' and 'location' are required".to_string(),
        ));
    }

    for mut society in state.db.list_societies().await? {
        if society.doc.venue(&request.name).is_some() {
            continue;
        }
        society.doc.venues.push(Venue::new(
            request.name.clone(),
            request.capacity,
            request.location.clone(),
        ));
        state.db.update_society(&society).await?;
    }

    Ok(empty_success("Venue added"))
}

/// Remove the venue from every society. Events that referenced it keep the
/// dangling name.
pub async fn delete_venue(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    for mut society in state.db.list_societies().await? {
        let before = society.doc.venues.len();
        society.doc.venues.retain(|venue| venue.name != name);
        if society.doc.venues.len() != before {
            state.db.update_society(&society).await?;
        }
    }

    Ok(empty_success("Venue deleted"))
}

/// An event flattened out of its society, with enough context for the admin
/// dashboard to act on it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModeratedEvent {
    #[serde(flatten)]
    event: Event,
    society_id: Uuid,
    society_name: String,
    event_index: usize,
}

pub async fn pending_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = collect_events(&state, Some(ApprovalStatus::Pending)).await?;
    Ok(success(events, "Pending events retrieved"))
}

pub async fn all_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = collect_events(&state, None).await?;
    Ok(success(events, "Events retrieved"))
}

async fn collect_events(
    state: &AppState,
    filter: Option<ApprovalStatus>,
) -> Result<Vec<ModeratedEvent>, AppError> {
    let mut events = Vec::new();
    for persisted in state.db.list_societies().await? {
        for (event_index, event) in persisted.doc.events.iter().enumerate() {
            if filter.map_or(true, |wanted| event.status == wanted) {
                events.push(ModeratedEvent {
                    event: event.clone(),
                    society_id: persisted.doc.id,
                    society_name: persisted.doc.name.clone(),
                    event_index,
                });
            }
        }
    }
    Ok(events)
}

/// Approve or reject a pending event; the decision is mirrored onto the
/// venue reservation, and approval re-validates the slot.
pub async fn set_event_status(
    State(state): State<AppState>,
    Path((society_id, event_index, action)): Path<(Uuid, usize, String)>,
) -> Result<Response, AppError> {
    let action: EventAction = action.parse()?;

    let mut society = state.db.society(society_id).await?;
    society.doc.set_event_status(event_index, action)?;
    state.db.update_society(&society).await?;

    Ok(success(society.doc, "Event status updated"))
}
