//! Lead Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::description::{self, LeadDescription};
use super::user::{UserId, UserSummary};

pub type LeadId = i64;

/// Lead lifecycle: New -> In Progress -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 3] = [Self::New, Self::InProgress, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    /// Sort rank, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lead as returned by `GET /leads`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    /// Title doubles as the lead's source (e.g. "Website", "Referral")
    #[serde(alias = "source")]
    pub title: String,
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub status: LeadStatus,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "description::deserialize_optional")]
    pub description: Option<LeadDescription>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_by: Option<UserSummary>,
    /// Current assignees, derived from the latest assignment set
    #[serde(default)]
    pub assignees: Vec<UserSummary>,
    /// Who performed the current assignments (display only)
    #[serde(default)]
    pub assigned_by: Vec<UserSummary>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignees.iter().any(|u| u.id == user_id)
    }

    pub fn assignee_ids(&self) -> Vec<UserId> {
        self.assignees.iter().map(|u| u.id).collect()
    }

    /// Distinct names of the users who made the current assignments
    pub fn assigned_by_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.assigned_by.len());
        for user in &self.assigned_by {
            if !names.contains(&user.name.as_str()) {
                names.push(&user.name);
            }
        }
        names
    }

    pub fn is_closed(&self) -> bool {
        self.status == LeadStatus::Closed
    }
}

/// Partial update for one lead (`PATCH /leads/{id}`)
///
/// `None` leaves the field untouched. `due_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LeadDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Local close stamp, set by the client when it closes a lead
    #[serde(skip)]
    pub closed: Option<(DateTime<Utc>, UserSummary)>,
}

impl LeadPatch {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn due_date(due_date: Option<NaiveDate>) -> Self {
        Self {
            due_date: Some(due_date),
            ..Default::default()
        }
    }

    pub fn description(description: LeadDescription) -> Self {
        Self {
            description: Some(description),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Only the status changes; routed to the dedicated status endpoint
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && Self {
                status: None,
                closed: None,
                ..self.clone()
            }
            .is_empty()
    }

    /// Merge into a lead, leaving every field not named by the patch untouched
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(title) = &self.title {
            lead.title = title.clone();
        }
        if let Some(name) = &self.customer_name {
            lead.customer_name = name.clone();
        }
        if let Some(phone) = &self.phone {
            lead.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            lead.email = email.clone();
        }
        if let Some(status) = self.status {
            lead.status = status;
            if status != LeadStatus::Closed {
                lead.closed_at = None;
                lead.closed_by = None;
            }
        }
        if let Some(priority) = self.priority {
            lead.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            lead.due_date = due_date;
        }
        if let Some(description) = &self.description {
            lead.description = Some(description.clone());
        }
        if let Some(state) = &self.state {
            lead.state = Some(state.clone());
        }
        if let Some(district) = &self.district {
            lead.district = Some(district.clone());
        }
        if let Some(location) = &self.location {
            lead.location = Some(location.clone());
        }
        if let Some((at, by)) = &self.closed {
            lead.closed_at = Some(*at);
            lead.closed_by = Some(by.clone());
        }
    }
}

/// Create lead payload (`POST /leads`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"))]
    pub phone: String,
    #[validate(email(message = "email is malformed"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LeadDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Lead {
        serde_json::from_value(json!({
            "id": 7,
            "title": "Website",
            "customerName": "Asha Rao",
            "phone": "9876543210",
            "email": "asha@example.com",
            "status": "In Progress",
            "priority": "High",
            "dueDate": "2026-11-02",
            "description": {"faqType": "Call", "variant": "Demo"},
            "createdAt": "2026-10-01T09:00:00Z",
            "updatedAt": "2026-10-02T09:00:00Z",
            "assignees": [{"id": 3, "name": "Ravi"}],
            "assignedBy": [{"id": 1, "name": "Meera"}, {"id": 1, "name": "Meera"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_lead() {
        let lead = sample();
        assert_eq!(lead.status, LeadStatus::InProgress);
        assert_eq!(lead.priority, Priority::High);
        assert!(lead.is_assigned_to(3));
        assert_eq!(lead.assigned_by_names(), vec!["Meera"]);
        assert_eq!(lead.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["status"] = json!("Archived");
        assert!(serde_json::from_value::<Lead>(value).is_err());
    }

    #[test]
    fn test_malformed_description_becomes_none() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["description"] = json!({});
        let lead: Lead = serde_json::from_value(value).unwrap();
        assert!(lead.description.is_none());
    }

    #[test]
    fn test_patch_touches_only_named_fields() {
        let original = sample();
        let mut lead = original.clone();
        LeadPatch::priority(Priority::Low).apply_to(&mut lead);

        assert_eq!(lead.priority, Priority::Low);
        assert_eq!(
            Lead {
                priority: original.priority,
                ..lead
            },
            original
        );
    }

    #[test]
    fn test_patch_clears_due_date() {
        let mut lead = sample();
        LeadPatch::due_date(None).apply_to(&mut lead);
        assert!(lead.due_date.is_none());
    }

    #[test]
    fn test_reopening_clears_close_stamp() {
        let mut lead = sample();
        let closer = UserSummary {
            id: 1,
            name: "Meera".into(),
        };
        let mut close = LeadPatch::status(LeadStatus::Closed);
        close.closed = Some((Utc::now(), closer.clone()));
        close.apply_to(&mut lead);
        assert_eq!(lead.closed_by, Some(closer));

        LeadPatch::status(LeadStatus::New).apply_to(&mut lead);
        assert!(lead.closed_at.is_none());
        assert!(lead.closed_by.is_none());
    }

    #[test]
    fn test_patch_serialization_skips_untouched() {
        let value = serde_json::to_value(LeadPatch::due_date(None)).unwrap();
        assert_eq!(value, json!({"dueDate": null}));

        let value = serde_json::to_value(LeadPatch::status(LeadStatus::InProgress)).unwrap();
        assert_eq!(value, json!({"status": "In Progress"}));
    }

    #[test]
    fn test_status_only() {
        assert!(LeadPatch::status(LeadStatus::Closed).is_status_only());
        let mut patch = LeadPatch::status(LeadStatus::Closed);
        patch.priority = Some(Priority::High);
        assert!(!patch.is_status_only());
        assert!(!LeadPatch::default().is_status_only());
    }

    #[test]
    fn test_new_lead_validation() {
        let mut lead = NewLead {
            title: "Referral".into(),
            customer_name: "Kiran".into(),
            phone: "9876543210".into(),
            email: Some("kiran@example.com".into()),
            priority: Priority::Medium,
            due_date: None,
            description: None,
            state: None,
            district: None,
            location: None,
        };
        assert!(lead.validate().is_ok());

        lead.email = Some("not-an-email".into());
        let errors = lead.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        lead.email = None;
        lead.customer_name = String::new();
        assert!(lead.validate().is_err());
    }
}
