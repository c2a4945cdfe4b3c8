use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::{ApprovalStatus, Event, EventAction, EventDraft, Reservation, Venue};
use crate::models::post::Post;
use crate::utils::error::AppError;

/// What happened to a member, for the society's audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Joined,
    Left,
    RoleAssigned,
    RoleRemoved,
    EventAttended,
    EventOrganized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub member_name: String,
    pub action: HistoryAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRole {
    pub member_name: String,
    pub role: String,
}

/// Registration payload for a new society.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyDraft {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// The aggregate root. A society owns its posts, events and venues (with
/// their nested reservations) outright; every operation here mutates the
/// document in memory and the caller persists it as one write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Society {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub member_roles: Vec<MemberRole>,
    #[serde(default)]
    pub member_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub venues: Vec<Venue>,
}

impl Society {
    pub fn register(draft: SocietyDraft, venues: Vec<Venue>) -> Result<Self, AppError> {
        for (field, value) in [
            ("name", &draft.name),
            ("description", &draft.description),
            ("category", &draft.category),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ValidationError(format!(
                    "Field '{}' is required",
                    field
                )));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            category: draft.category,
            is_approved: false,
            members: Vec::new(),
            member_roles: Vec::new(),
            member_history: Vec::new(),
            posts: Vec::new(),
            events: Vec::new(),
            venues,
        })
    }

    pub fn venue(&self, name: &str) -> Option<&Venue> {
        self.venues.iter().find(|venue| venue.name == name)
    }

    fn venue_index(&self, name: &str) -> Option<usize> {
        self.venues.iter().position(|venue| venue.name == name)
    }

    /// Book a venue slot for a new event. On success exactly one pending
    /// event and one matching pending reservation are appended; on any
    /// failure the society is untouched.
    pub fn book_event(
        &mut self,
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Uuid, AppError> {
        draft.validate()?;

        let venue_index = self
            .venue_index(&draft.venue)
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        if self.venues[venue_index].has_approved_conflict(
            draft.date,
            &draft.start_time,
            &draft.end_time,
            None,
        ) {
            return Err(AppError::Conflict(
                "Venue is already reserved for this time slot".to_string(),
            ));
        }

        let event = draft.into_event(now);
        let event_id = event.id;
        self.venues[venue_index].reservations.push(Reservation {
            event_id,
            date: event.date,
            start_time: event.start_time.clone(),
            end_time: event.end_time.clone(),
            status: ApprovalStatus::Pending,
        });
        self.events.push(event);

        Ok(event_id)
    }

    /// Approve or reject the event at `index`, mirroring the decision onto
    /// its venue reservation. Approval re-checks the slot against the other
    /// already-approved reservations so that two overlapping pendings can
    /// never both end up approved.
    pub fn set_event_status(
        &mut self,
        index: usize,
        action: EventAction,
    ) -> Result<(), AppError> {
        let event = self
            .events
            .get(index)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let event_id = event.id;
        let venue_name = event.venue.clone();
        let (date, start, end) = (event.date, event.start_time.clone(), event.end_time.clone());
        let status = action.resulting_status();

        if status == ApprovalStatus::Approved {
            if let Some(venue) = self.venue(&venue_name) {
                if venue.has_approved_conflict(date, &start, &end, Some(event_id)) {
                    return Err(AppError::Conflict(
                        "Venue is already reserved for this time slot".to_string(),
                    ));
                }
            }
        }

        self.events[index].status = status;

        // The venue (or its reservation) may have been deleted since booking;
        // the event decision stands either way.
        if let Some(venue_index) = self.venue_index(&venue_name) {
            if let Some(reservation) = self.venues[venue_index]
                .reservations
                .iter_mut()
                .find(|reservation| reservation.event_id == event_id)
            {
                reservation.status = status;
            }
        }

        Ok(())
    }

    /// Publish every announcement whose scheduled time has arrived. Returns
    /// how many were flipped; calling again with the same `now` is a no-op.
    pub fn activate_due_posts(&mut self, now: DateTime<Utc>) -> usize {
        let mut activated = 0;
        for post in &mut self.posts {
            if post.is_due(now) {
                post.is_posted = true;
                activated += 1;
            }
        }
        activated
    }

    /// Announcements still waiting for the sweeper.
    pub fn upcoming_announcements(&self, now: DateTime<Utc>) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|post| {
                post.is_announcement && post.scheduled_for.map_or(false, |at| at > now)
            })
            .collect()
    }

    /// Approved events happening within the next day.
    pub fn event_reminders(&self, now: DateTime<Utc>) -> Vec<&Event> {
        let today = now.date_naive();
        let tomorrow = today + Duration::days(1);
        self.events
            .iter()
            .filter(|event| {
                event.status == ApprovalStatus::Approved
                    && event.date >= today
                    && event.date <= tomorrow
            })
            .collect()
    }

    pub fn post(&self, index: usize) -> Result<&Post, AppError> {
        self.posts
            .get(index)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    pub fn post_mut(&mut self, index: usize) -> Result<&mut Post, AppError> {
        self.posts
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    pub fn event_mut(&mut self, index: usize) -> Result<&mut Event, AppError> {
        self.events
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    pub fn record_history(
        &mut self,
        member_name: &str,
        action: HistoryAction,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.member_history.push(HistoryEntry {
            member_name: member_name.to_string(),
            action,
            details: details.into(),
            timestamp: now,
        });
    }

    /// Admit an accepted applicant. Admitting an existing member again is a
    /// no-op and leaves no duplicate history entry.
    pub fn admit_member(&mut self, student_name: &str, now: DateTime<Utc>) {
        if self.is_member(student_name) {
            return;
        }
        self.members.push(student_name.to_string());
        self.record_history(student_name, HistoryAction::Joined, "Joined the society", now);
    }

    pub fn remove_member(&mut self, student_name: &str, now: DateTime<Utc>) {
        self.members.retain(|member| member != student_name);
        self.member_roles
            .retain(|role| role.member_name != student_name);
        self.record_history(student_name, HistoryAction::Left, "Left the society", now);
    }

    /// Give `member_name` a role. Each role is held by at most one member
    /// and each member holds at most one role.
    pub fn assign_role(
        &mut self,
        member_name: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if !self.is_member(member_name) {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        if self
            .member_roles
            .iter()
            .any(|held| held.role == role && held.member_name != member_name)
        {
            return Err(AppError::ValidationError(
                "This role is already assigned to another member".to_string(),
            ));
        }

        if let Some(old) = self
            .member_roles
            .iter()
            .find(|held| held.member_name == member_name)
        {
            let details = format!("Removed from role: {}", old.role);
            self.record_history(member_name, HistoryAction::RoleRemoved, details, now);
        }
        self.member_roles
            .retain(|held| held.member_name != member_name);

        self.member_roles.push(MemberRole {
            member_name: member_name.to_string(),
            role: role.to_string(),
        });
        self.record_history(
            member_name,
            HistoryAction::RoleAssigned,
            format!("Assigned role: {}", role),
            now,
        );
        Ok(())
    }

    pub fn remove_role(&mut self, member_name: &str) {
        self.member_roles
            .retain(|held| held.member_name != member_name);
    }

    pub fn history_for(&self, member_name: &str) -> Vec<&HistoryEntry> {
        self.member_history
            .iter()
            .filter(|entry| entry.member_name == member_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::models::event::slots_overlap;

    fn mock_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn mock_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn mock_society() -> Society {
        Society {
            id: Uuid::new_v4(),
            name: "Computing Society".to_string(),
            description: "For computer science enthusiasts".to_string(),
            category: "Technical".to_string(),
            is_approved: true,
            members: vec!["Sarah".to_string(), "Ahmed".to_string()],
            member_roles: Vec::new(),
            member_history: Vec::new(),
            posts: Vec::new(),
            events: Vec::new(),
            venues: vec![Venue::new(
                "Auditorium".to_string(),
                500,
                "Main Campus".to_string(),
            )],
        }
    }

    fn draft(start: &str, end: &str) -> EventDraft {
        EventDraft {
            name: "Tech Talk".to_string(),
            description: "Guest speaker session".to_string(),
            date: mock_date(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            venue: "Auditorium".to_string(),
        }
    }

    fn book_and_approve(society: &mut Society, start: &str, end: &str) {
        society.book_event(draft(start, end), mock_now()).unwrap();
        let index = society.events.len() - 1;
        society.set_event_status(index, EventAction::Approve).unwrap();
    }

    #[test]
    fn booking_an_empty_venue_succeeds() {
        let mut society = mock_society();
        let event_id = society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();

        assert_eq!(society.events.len(), 1);
        assert_eq!(society.events[0].status, ApprovalStatus::Pending);
        let reservations = &society.venue("Auditorium").unwrap().reservations;
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].event_id, event_id);
        assert_eq!(reservations[0].status, ApprovalStatus::Pending);
    }

    #[test]
    fn booking_an_unknown_venue_fails_without_mutation() {
        let mut society = mock_society();
        let mut bad = draft("10:00", "11:00");
        bad.venue = "Observatory".to_string();

        let err = society.book_event(bad, mock_now()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(society.events.is_empty());
        assert!(society.venue("Auditorium").unwrap().reservations.is_empty());
    }

    #[test]
    fn touching_slots_do_not_conflict() {
        let mut society = mock_society();
        book_and_approve(&mut society, "10:00", "11:00");
        assert!(society.book_event(draft("11:00", "12:00"), mock_now()).is_ok());
    }

    #[test]
    fn contained_slot_conflicts() {
        let mut society = mock_society();
        book_and_approve(&mut society, "10:00", "11:00");

        let err = society
            .book_event(draft("10:30", "10:45"), mock_now())
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(society.events.len(), 1);
        assert_eq!(society.venue("Auditorium").unwrap().reservations.len(), 1);
    }

    #[test]
    fn partial_overlap_conflicts() {
        let mut society = mock_society();
        book_and_approve(&mut society, "10:00", "12:00");

        let err = society
            .book_event(draft("11:00", "13:00"), mock_now())
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn pending_reservations_do_not_block_booking() {
        let mut society = mock_society();
        society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();
        // Same slot again: the first booking is still pending.
        assert!(society.book_event(draft("10:00", "11:00"), mock_now()).is_ok());
    }

    #[test]
    fn approving_the_second_of_two_overlapping_pendings_conflicts() {
        let mut society = mock_society();
        society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();
        society.book_event(draft("10:30", "11:30"), mock_now()).unwrap();

        society.set_event_status(0, EventAction::Approve).unwrap();
        let err = society.set_event_status(1, EventAction::Approve).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(society.events[1].status, ApprovalStatus::Pending);
        let reservations = &society.venue("Auditorium").unwrap().reservations;
        assert_eq!(reservations[1].status, ApprovalStatus::Pending);
    }

    #[test]
    fn rejecting_never_conflicts_and_mirrors_onto_the_reservation() {
        let mut society = mock_society();
        society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();
        society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();

        society.set_event_status(0, EventAction::Approve).unwrap();
        society.set_event_status(1, EventAction::Reject).unwrap();

        assert_eq!(society.events[1].status, ApprovalStatus::Rejected);
        let reservations = &society.venue("Auditorium").unwrap().reservations;
        assert_eq!(reservations[1].status, ApprovalStatus::Rejected);
    }

    #[test]
    fn approved_reservations_never_overlap_pairwise() {
        let mut society = mock_society();
        book_and_approve(&mut society, "09:00", "10:00");
        book_and_approve(&mut society, "10:00", "11:30");
        society.book_event(draft("11:00", "12:00"), mock_now()).unwrap_err();
        book_and_approve(&mut society, "11:30", "12:00");

        let approved: Vec<_> = society
            .venue("Auditorium")
            .unwrap()
            .reservations
            .iter()
            .filter(|reservation| reservation.status == ApprovalStatus::Approved)
            .collect();
        for (i, a) in approved.iter().enumerate() {
            for b in approved.iter().skip(i + 1) {
                assert!(
                    !slots_overlap(&a.start_time, &a.end_time, &b.start_time, &b.end_time),
                    "approved reservations {}..{} and {}..{} overlap",
                    a.start_time,
                    a.end_time,
                    b.start_time,
                    b.end_time
                );
            }
        }
    }

    #[test]
    fn out_of_range_status_change_leaves_the_society_unmodified() {
        let mut society = mock_society();
        society.book_event(draft("10:00", "11:00"), mock_now()).unwrap();
        let before = serde_json::to_value(&society).unwrap();

        let err = society.set_event_status(5, EventAction::Approve).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(serde_json::to_value(&society).unwrap(), before);
    }

    #[test]
    fn sweep_activates_exactly_the_due_announcements() {
        let mut society = mock_society();
        let t0 = mock_now();
        society.posts.push(Post::scheduled("due".to_string(), t0, t0));
        society.posts.push(Post::scheduled(
            "future".to_string(),
            t0 + Duration::hours(2),
            t0,
        ));
        society.posts.push(Post::new("immediate".to_string(), false, t0));

        assert_eq!(society.activate_due_posts(t0 - Duration::minutes(1)), 0);
        assert_eq!(society.activate_due_posts(t0), 1);
        assert!(society.posts[0].is_posted);
        assert!(!society.posts[1].is_posted);
        assert!(!society.posts[2].is_posted);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut society = mock_society();
        let t0 = mock_now();
        society.posts.push(Post::scheduled("due".to_string(), t0, t0));

        assert_eq!(society.activate_due_posts(t0), 1);
        assert_eq!(society.activate_due_posts(t0), 0);
        assert_eq!(society.activate_due_posts(t0 + Duration::hours(1)), 0);
    }

    #[test]
    fn upcoming_announcements_are_the_unswept_complement() {
        let mut society = mock_society();
        let t0 = mock_now();
        society.posts.push(Post::scheduled("due".to_string(), t0, t0));
        society.posts.push(Post::scheduled(
            "future".to_string(),
            t0 + Duration::hours(2),
            t0,
        ));

        let upcoming = society.upcoming_announcements(t0);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].content, "future");
    }

    #[test]
    fn reminders_cover_approved_events_in_the_next_day() {
        let mut society = mock_society();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        book_and_approve(&mut society, "10:00", "11:00");
        // Pending booking on the same day is not reminded.
        society.book_event(draft("12:00", "13:00"), mock_now()).unwrap();

        let reminders = society.event_reminders(now);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].start_time, "10:00");
        assert!(society.event_reminders(now + Duration::days(3)).is_empty());
    }

    #[test]
    fn role_assignment_is_exclusive_per_role() {
        let mut society = mock_society();
        society.assign_role("Sarah", "President", mock_now()).unwrap();

        let err = society
            .assign_role("Ahmed", "President", mock_now())
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // Reassigning the same member to a new role records the removal.
        society.assign_role("Sarah", "Treasurer", mock_now()).unwrap();
        assert_eq!(society.member_roles.len(), 1);
        assert_eq!(society.member_roles[0].role, "Treasurer");
        assert!(society
            .member_history
            .iter()
            .any(|entry| entry.action == HistoryAction::RoleRemoved));
    }

    #[test]
    fn assigning_a_role_to_a_non_member_fails() {
        let mut society = mock_society();
        let err = society
            .assign_role("Stranger", "President", mock_now())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn leaving_clears_membership_and_roles() {
        let mut society = mock_society();
        society.assign_role("Sarah", "President", mock_now()).unwrap();
        society.remove_member("Sarah", mock_now());

        assert!(!society.is_member("Sarah"));
        assert!(society.member_roles.is_empty());
        assert!(society
            .member_history
            .iter()
            .any(|entry| entry.action == HistoryAction::Left));
    }

    #[test]
    fn admitting_twice_adds_one_member_and_one_history_entry() {
        let mut society = mock_society();
        society.admit_member("Fatima", mock_now());
        society.admit_member("Fatima", mock_now());

        assert_eq!(
            society.members.iter().filter(|m| *m == "Fatima").count(),
            1
        );
        assert_eq!(society.history_for("Fatima").len(), 1);
    }
}
