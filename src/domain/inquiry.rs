use serde::{Deserialize, Serialize};

use crate::domain::{
    require, string_or_number, DomainError, Filter, NoAction, Payload, Resource, Simulated,
    SortValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InquiryStatus {
    #[default]
    New,
    #[serde(rename = "In Review")]
    InReview,
    Contacted,
    Closed,
}

impl InquiryStatus {
    pub const ALL: [InquiryStatus; 4] = [
        InquiryStatus::New,
        InquiryStatus::InReview,
        InquiryStatus::Contacted,
        InquiryStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "New",
            InquiryStatus::InReview => "In Review",
            InquiryStatus::Contacted => "Contacted",
            InquiryStatus::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// A franchise acquisition inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: String,
    pub name: String,
    pub info: String,
    pub email: String,
    pub phone: String,
    pub status: InquiryStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InquiryDraft {
    pub name: String,
    pub info: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InquiryChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InquiryStatus>,
}

impl Resource for Inquiry {
    type Wire = InquiryWire;
    type Draft = InquiryDraft;
    type Changes = InquiryChanges;
    type Action = NoAction;

    const NAME: &'static str = "inquiries";
    const ENDPOINT: &'static str = "/api/v1/acquisitions";
    const SORT_KEYS: &'static [&'static str] = &["name", "email", "status", "createdAt", "created_at", "date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: InquiryWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            info: wire.info,
            email: wire.email,
            phone: wire.phone,
            status: wire.status,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> InquiryWire {
        InquiryWire {
            id: self.id.clone(),
            name: self.name.clone(),
            info: self.info.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            status: self.status,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &InquiryDraft) -> Result<(), DomainError> {
        require("name", &draft.name)?;
        require("email", &draft.email)
    }

    fn draft_payload(draft: &InquiryDraft) -> Payload {
        Payload::json(draft)
    }

    fn changes_payload(changes: &InquiryChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.name, &self.email, &self.info])
            && Filter::equals(&filter.status, self.status.as_str())
            && filter.date_in_range(&self.created_at)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "email" => Some(SortValue::text(&self.email)),
            "status" => Some(SortValue::text(self.status.as_str())),
            "createdAt" | "created_at" | "date" => Some(SortValue::date(&self.created_at)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Name", "Email", "Phone", "Info", "Status", "Created"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.info.clone(),
            self.status.as_str().to_string(),
            self.created_at.clone(),
        ]
    }
}

impl Simulated for Inquiry {
    fn wire_id(wire: &InquiryWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &InquiryDraft, now: &str) -> InquiryWire {
        InquiryWire {
            id,
            name: draft.name.clone(),
            info: draft.info.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            status: InquiryStatus::New,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_changes(wire: &mut InquiryWire, changes: &InquiryChanges, now: &str) {
        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.info {
            wire.info = v.clone();
        }
        if let Some(v) = &changes.email {
            wire.email = v.clone();
        }
        if let Some(v) = &changes.phone {
            wire.phone = v.clone();
        }
        if let Some(v) = changes.status {
            wire.status = v;
        }
        wire.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_review_status_on_the_wire() {
        let wire: InquiryWire = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Franchise NYC",
            "status": "In Review"
        }))
        .unwrap();
        let local = Inquiry::from_wire(wire);
        assert_eq!(local.status, InquiryStatus::InReview);
        assert!(local.matches(&Filter::new().status("in review")));

        let changes = InquiryChanges {
            status: Some(InquiryStatus::Closed),
            ..Default::default()
        };
        assert_eq!(
            Inquiry::changes_payload(&changes),
            Payload::Json(serde_json::json!({"status": "Closed"}))
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(InquiryStatus::parse("contacted"), Some(InquiryStatus::Contacted));
        assert_eq!(InquiryStatus::parse("pending"), None);
    }
}
