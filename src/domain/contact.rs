use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{
    require, string_or_number, DomainError, Filter, NoAction, Payload, Resource, Simulated,
    SortValue,
};

pub const ACTION_STATUS_CHANGED: &str = "status_changed";
pub const ACTION_RESPONDED: &str = "responded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Completed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    fn rank(&self) -> f64 {
        match self {
            Priority::Low => 0.0,
            Priority::Medium => 1.0,
            Priority::High => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    #[default]
    General,
    Support,
    Feedback,
    Partnership,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::General => "general",
            ContactType::Support => "support",
            ContactType::Feedback => "feedback",
            ContactType::Partnership => "partnership",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponseWire {
    pub text: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "respondent_name")]
    pub respondent_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineWire {
    pub date: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// The contacts API speaks camelCase; snake_case keys are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type", default)]
    pub kind: ContactType,
    #[serde(default, alias = "received_date")]
    pub received_date: String,
    #[serde(default, alias = "last_updated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ContactResponseWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub text: String,
    pub date: String,
    pub respondent_name: String,
}

/// Append-only audit record of a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub timestamp: String,
    pub action: String,
    pub note: Option<String>,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub kind: ContactType,
    pub received_date: String,
    pub last_updated: Option<String>,
    pub response: Option<ContactResponse>,
    pub notes: Option<String>,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ContactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDraft {
    pub text: String,
    pub respondent_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactChanges {
    pub fn status(status: ContactStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn respond(text: impl Into<String>, respondent_name: impl Into<String>) -> Self {
        Self {
            response: Some(ResponseDraft {
                text: text.into(),
                respondent_name: respondent_name.into(),
            }),
            ..Default::default()
        }
    }
}

/// Timeline entries produced by applying `changes` to a contact whose
/// status was `previous`.
pub fn timeline_entries_for(
    previous: Option<ContactStatus>,
    changes: &ContactChanges,
    now: &str,
) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    if let Some(status) = changes.status {
        if previous != Some(status) {
            entries.push(TimelineEntry {
                timestamp: now.to_string(),
                action: ACTION_STATUS_CHANGED.to_string(),
                note: Some(format!("Status changed to {}", status)),
                actor: None,
            });
        }
    }
    if let Some(response) = &changes.response {
        entries.push(TimelineEntry {
            timestamp: now.to_string(),
            action: ACTION_RESPONDED.to_string(),
            note: Some(response.text.clone()),
            actor: Some(response.respondent_name.clone()),
        });
    }
    entries
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    require("email", email)?;
    if !email.contains('@') {
        return Err(DomainError::validation(format!("invalid email: {}", email)));
    }
    Ok(())
}

impl From<TimelineWire> for TimelineEntry {
    fn from(wire: TimelineWire) -> Self {
        Self {
            timestamp: wire.date,
            action: wire.action,
            note: wire.notes,
            actor: wire.user,
        }
    }
}

impl From<&TimelineEntry> for TimelineWire {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            date: entry.timestamp.clone(),
            action: entry.action.clone(),
            notes: entry.note.clone(),
            user: entry.actor.clone(),
        }
    }
}

impl Resource for Contact {
    type Wire = ContactWire;
    type Draft = ContactDraft;
    type Changes = ContactChanges;
    type Action = NoAction;

    const NAME: &'static str = "contacts";
    const ENDPOINT: &'static str = "/api/v1/contacts";
    const SORT_KEYS: &'static [&'static str] = &["name", "email", "subject", "status", "priority", "receivedDate", "received_date", "date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: ContactWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            phone: wire.phone,
            subject: wire.subject,
            message: wire.message,
            status: wire.status,
            priority: wire.priority,
            kind: wire.kind,
            received_date: wire.received_date,
            last_updated: wire.last_updated,
            response: wire.response.map(|r| ContactResponse {
                text: r.text,
                date: r.date,
                respondent_name: r.respondent_name,
            }),
            notes: wire.notes,
            timeline: wire.timeline.into_iter().map(TimelineEntry::from).collect(),
        }
    }

    fn to_wire(&self) -> ContactWire {
        ContactWire {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            status: self.status,
            priority: self.priority,
            kind: self.kind,
            received_date: self.received_date.clone(),
            last_updated: self.last_updated.clone(),
            response: self.response.as_ref().map(|r| ContactResponseWire {
                text: r.text.clone(),
                date: r.date.clone(),
                respondent_name: r.respondent_name.clone(),
            }),
            notes: self.notes.clone(),
            timeline: self.timeline.iter().map(TimelineWire::from).collect(),
        }
    }

    fn validate_draft(draft: &ContactDraft) -> Result<(), DomainError> {
        require("name", &draft.name)?;
        validate_email(&draft.email)?;
        require("subject", &draft.subject)?;
        require("message", &draft.message)
    }

    fn validate_changes(changes: &ContactChanges) -> Result<(), DomainError> {
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        if let Some(response) = &changes.response {
            require("response text", &response.text)?;
        }
        Ok(())
    }

    fn draft_payload(draft: &ContactDraft) -> Payload {
        Payload::json(draft)
    }

    fn changes_payload(changes: &ContactChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.name, &self.email, &self.subject, &self.message])
            && Filter::equals(&filter.status, self.status.as_str())
            && Filter::equals(&filter.priority, self.priority.as_str())
            && Filter::equals(&filter.kind, self.kind.as_str())
            && filter.date_in_range(&self.received_date)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "email" => Some(SortValue::text(&self.email)),
            "subject" => Some(SortValue::text(&self.subject)),
            "status" => Some(SortValue::text(self.status.as_str())),
            "priority" => Some(SortValue::Number(self.priority.rank())),
            "receivedDate" | "received_date" | "date" => {
                Some(SortValue::date(&self.received_date))
            }
            _ => None,
        }
    }

    /// Keeps the timeline append-only when the server echoes the record
    /// without recording the change itself.
    fn reconcile(previous: Option<&Contact>, mut updated: Contact, changes: &ContactChanges) -> Contact {
        let Some(previous) = previous else {
            return updated;
        };
        if updated.timeline.len() > previous.timeline.len() {
            return updated;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut timeline = previous.timeline.clone();
        timeline.extend(timeline_entries_for(Some(previous.status), changes, &now));
        updated.timeline = timeline;

        if updated.response.is_none() {
            if let Some(response) = &changes.response {
                updated.response = Some(ContactResponse {
                    text: response.text.clone(),
                    date: now,
                    respondent_name: response.respondent_name.clone(),
                });
            }
        }
        updated
    }

    fn export_headers() -> &'static [&'static str] {
        &[
            "Name", "Email", "Phone", "Subject", "Type", "Priority", "Status", "Received",
        ]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.subject.clone(),
            self.kind.as_str().to_string(),
            self.priority.as_str().to_string(),
            self.status.as_str().to_string(),
            self.received_date.clone(),
        ]
    }
}

impl Simulated for Contact {
    fn wire_id(wire: &ContactWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &ContactDraft, now: &str) -> ContactWire {
        ContactWire {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            subject: draft.subject.clone(),
            message: draft.message.clone(),
            status: ContactStatus::Pending,
            priority: draft.priority.unwrap_or_default(),
            kind: draft.kind,
            received_date: now.to_string(),
            last_updated: None,
            response: None,
            notes: None,
            timeline: Vec::new(),
        }
    }

    fn apply_changes(wire: &mut ContactWire, changes: &ContactChanges, now: &str) {
        let entries = timeline_entries_for(Some(wire.status), changes, now);

        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.email {
            wire.email = v.clone();
        }
        if let Some(v) = &changes.phone {
            wire.phone = v.clone();
        }
        if let Some(v) = &changes.subject {
            wire.subject = v.clone();
        }
        if let Some(v) = &changes.message {
            wire.message = v.clone();
        }
        if let Some(v) = changes.kind {
            wire.kind = v;
        }
        if let Some(v) = changes.priority {
            wire.priority = v;
        }
        if let Some(v) = changes.status {
            wire.status = v;
        }
        if let Some(v) = &changes.notes {
            wire.notes = Some(v.clone());
        }
        if let Some(r) = &changes.response {
            wire.response = Some(ContactResponseWire {
                text: r.text.clone(),
                date: now.to_string(),
                respondent_name: r.respondent_name.clone(),
            });
        }

        wire.timeline.extend(entries.iter().map(TimelineWire::from));
        wire.last_updated = Some(now.to_string());
    }
}
