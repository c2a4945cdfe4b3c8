use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Which dashboard a user logs in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    Student,
    Society,
    Admin,
}

impl UserKind {
    /// The wire token, as stored in the document's `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            UserKind::Student => "Student",
            UserKind::Society => "Society",
            UserKind::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Requested,
    Accepted,
    Rejected,
}

/// A student's request to join a society, tracked on the student's own
/// record and keyed by society name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub society_name: String,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl User {
    pub fn new(name: String, kind: UserKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            applications: Vec::new(),
        }
    }

    pub fn application_for(&self, society_name: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.society_name == society_name)
    }

    /// Record a new membership request. Applying twice to the same society
    /// is rejected regardless of the earlier application's status.
    pub fn apply_to(&mut self, society_name: &str) -> Result<(), AppError> {
        if self.application_for(society_name).is_some() {
            return Err(AppError::ValidationError(
                "Already applied to this society".to_string(),
            ));
        }

        self.applications.push(Application {
            society_name: society_name.to_string(),
            status: ApplicationStatus::Requested,
        });
        Ok(())
    }

    pub fn set_application_status(&mut self, society_name: &str, status: ApplicationStatus) {
        if let Some(application) = self
            .applications
            .iter_mut()
            .find(|application| application.society_name == society_name)
        {
            application.status = status;
        }
    }

    /// Forget the application entirely, as when a member leaves.
    pub fn withdraw_application(&mut self, society_name: &str) {
        self.applications
            .retain(|application| application.society_name != society_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_twice_is_rejected() {
        let mut student = User::new("Sarah".to_string(), UserKind::Student);
        student.apply_to("Chess Club").unwrap();
        assert!(student.apply_to("Chess Club").is_err());
        assert_eq!(student.applications.len(), 1);
    }

    #[test]
    fn status_updates_only_touch_the_named_society() {
        let mut student = User::new("Sarah".to_string(), UserKind::Student);
        student.apply_to("Chess Club").unwrap();
        student.apply_to("Debate Club").unwrap();

        student.set_application_status("Chess Club", ApplicationStatus::Accepted);

        assert_eq!(
            student.application_for("Chess Club").unwrap().status,
            ApplicationStatus::Accepted
        );
        assert_eq!(
            student.application_for("Debate Club").unwrap().status,
            ApplicationStatus::Requested
        );
    }

    #[test]
    fn withdrawing_removes_the_application() {
        let mut student = User::new("Sarah".to_string(), UserKind::Student);
        student.apply_to("Chess Club").unwrap();
        student.withdraw_application("Chess Club");
        assert!(student.application_for("Chess Club").is_none());
    }

    #[test]
    fn user_kind_serializes_as_the_wire_type_field() {
        let user = User::new("admin".to_string(), UserKind::Admin);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "Admin");
    }
}
