use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short remark left on a post or an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A society feed entry. Announcements with a `scheduled_for` timestamp stay
/// dormant until the sweeper flips `is_posted`; everything else is live from
/// the moment it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub is_announcement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_posted: bool,
    pub created_at: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(content: String, is_announcement: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            is_announcement,
            scheduled_for: None,
            is_posted: false,
            created_at: now,
            last_edited: now,
            edited_by: None,
            attachments: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn scheduled(content: String, scheduled_for: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            is_announcement: true,
            scheduled_for: Some(scheduled_for),
            ..Self::new(content, true, now)
        }
    }

    /// True once the announcement's scheduled time has arrived but the
    /// sweeper has not yet published it.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_announcement
            && !self.is_posted
            && self.scheduled_for.map_or(false, |at| at <= now)
    }
}
