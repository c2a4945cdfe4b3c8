use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::post::Comment;
use crate::utils::error::AppError;

/// Shared lifecycle for events and their venue reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admin decision on a pending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Approve,
    Reject,
}

impl EventAction {
    pub fn resulting_status(self) -> ApprovalStatus {
        match self {
            EventAction::Approve => ApprovalStatus::Approved,
            EventAction::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl FromStr for EventAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(EventAction::Approve),
            "reject" => Ok(EventAction::Reject),
            other => Err(AppError::ValidationError(format!(
                "Invalid action '{}', expected 'approve' or 'reject'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// Weak reference by name; the venue may have been deleted since.
    pub venue: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A booking request as submitted by a society dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
}

impl EventDraft {
    /// Field-level validation. Times must be zero-padded 24-hour "HH:MM" so
    /// that string comparison agrees with time order, and the slot must not
    /// be empty or inverted.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("venue", &self.venue),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ValidationError(format!(
                    "Field '{}' is required",
                    field
                )));
            }
        }

        for (field, value) in [("startTime", &self.start_time), ("endTime", &self.end_time)] {
            if parse_hhmm(value).is_none() {
                return Err(AppError::ValidationError(format!(
                    "Field '{}' must be a zero-padded HH:MM time",
                    field
                )));
            }
        }

        if self.start_time >= self.end_time {
            return Err(AppError::ValidationError(
                "startTime must be before endTime".to_string(),
            ));
        }

        Ok(())
    }

    pub fn into_event(self, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            venue: self.venue,
            status: ApprovalStatus::Pending,
            created_at: now,
            comments: Vec::new(),
        }
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// A time-slot claim on a venue, tied to one event by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub event_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub name: String,
    pub capacity: u32,
    pub location: String,
    pub is_available: bool,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl Venue {
    pub fn new(name: String, capacity: u32, location: String) -> Self {
        Self {
            name,
            capacity,
            location,
            is_available: true,
            reservations: Vec::new(),
        }
    }

    /// True if an approved reservation on `date` overlaps the half-open slot
    /// `[start, end)`. Reservations for `exclude` (the event being
    /// re-validated at approval time) are skipped.
    pub fn has_approved_conflict(
        &self,
        date: NaiveDate,
        start: &str,
        end: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        self.reservations.iter().any(|reservation| {
            exclude != Some(reservation.event_id)
                && reservation.status == ApprovalStatus::Approved
                && reservation.date == date
                && slots_overlap(start, end, &reservation.start_time, &reservation.end_time)
        })
    }
}

/// Half-open interval intersection on "HH:MM" strings. Touching at a
/// boundary (a_end == b_start) is not an overlap.
pub fn slots_overlap(a_start: &str, a_end: &str, b_start: &str, b_end: &str) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(start: &str, end: &str) -> EventDraft {
        EventDraft {
            name: "Intro Session".to_string(),
            description: "Kickoff meeting".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            venue: "Auditorium".to_string(),
        }
    }

    #[test]
    fn overlap_is_symmetric_and_half_open() {
        // Partial overlap, either direction
        assert!(slots_overlap("10:00", "12:00", "11:00", "13:00"));
        assert!(slots_overlap("11:00", "13:00", "10:00", "12:00"));
        // Full containment, either direction
        assert!(slots_overlap("10:00", "11:00", "10:15", "10:45"));
        assert!(slots_overlap("10:15", "10:45", "10:00", "11:00"));
        // Identical slots
        assert!(slots_overlap("10:00", "11:00", "10:00", "11:00"));
        // Touching boundaries are free
        assert!(!slots_overlap("10:00", "11:00", "11:00", "12:00"));
        assert!(!slots_overlap("11:00", "12:00", "10:00", "11:00"));
        // Disjoint
        assert!(!slots_overlap("08:00", "09:00", "14:00", "15:00"));
    }

    #[test]
    fn draft_validation_accepts_well_formed_input() {
        assert!(draft("09:00", "10:30").validate().is_ok());
    }

    #[test]
    fn draft_validation_rejects_inverted_or_empty_slots() {
        assert!(draft("11:00", "10:00").validate().is_err());
        assert!(draft("10:00", "10:00").validate().is_err());
    }

    #[test]
    fn draft_validation_rejects_unpadded_times() {
        assert!(draft("9:00", "10:00").validate().is_err());
        assert!(draft("09:00", "25:00").validate().is_err());
        assert!(draft("09:00", "later").validate().is_err());
    }

    #[test]
    fn draft_validation_rejects_blank_fields() {
        let mut d = draft("09:00", "10:00");
        d.venue = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn event_action_parses_known_tokens_only() {
        assert_eq!(
            "approve".parse::<EventAction>().unwrap(),
            EventAction::Approve
        );
        assert_eq!("reject".parse::<EventAction>().unwrap(), EventAction::Reject);
        assert!("cancel".parse::<EventAction>().is_err());
    }
}
