//! About-page content: team members and company milestones.

use serde::{Deserialize, Serialize};

use crate::domain::{
    require, string_or_number, DomainError, Filter, NoAction, Payload, Resource, Simulated,
    SortValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub image_url: String,
    pub description: String,
    pub status: MemberStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberDraft {
    pub name: String,
    pub role: String,
    pub image_url: String,
    pub description: String,
    pub status: MemberStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<MemberStatus>,
}

fn image_or_null(url: &str) -> serde_json::Value {
    if url.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(url.to_string())
    }
}

impl Resource for TeamMember {
    type Wire = TeamMemberWire;
    type Draft = TeamMemberDraft;
    type Changes = TeamMemberChanges;
    type Action = NoAction;

    const NAME: &'static str = "team-members";
    const ENDPOINT: &'static str = "/api/v1/team-members";
    const SORT_KEYS: &'static [&'static str] = &["name", "role", "createdAt", "created_at", "date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: TeamMemberWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            role: wire.role,
            image_url: wire.profile_image.unwrap_or_default(),
            description: wire.description,
            status: wire.status.unwrap_or_default(),
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> TeamMemberWire {
        TeamMemberWire {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            profile_image: Some(self.image_url.clone()).filter(|s| !s.is_empty()),
            description: self.description.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            status: Some(self.status),
        }
    }

    fn validate_draft(draft: &TeamMemberDraft) -> Result<(), DomainError> {
        require("name", &draft.name)?;
        require("role", &draft.role)
    }

    fn draft_payload(draft: &TeamMemberDraft) -> Payload {
        Payload::json(&serde_json::json!({
            "name": draft.name,
            "role": draft.role,
            "description": draft.description,
            "status": draft.status,
            "profile_image": image_or_null(&draft.image_url),
        }))
    }

    fn changes_payload(changes: &TeamMemberChanges) -> Payload {
        let mut body = serde_json::Map::new();
        if let Some(v) = &changes.name {
            body.insert("name".into(), v.clone().into());
        }
        if let Some(v) = &changes.role {
            body.insert("role".into(), v.clone().into());
        }
        if let Some(v) = &changes.description {
            body.insert("description".into(), v.clone().into());
        }
        if let Some(v) = changes.status {
            body.insert("status".into(), v.as_str().into());
        }
        if let Some(v) = &changes.image_url {
            body.insert("profile_image".into(), image_or_null(v));
        }
        Payload::Json(serde_json::Value::Object(body))
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.name, &self.role])
            && Filter::equals(&filter.status, self.status.as_str())
            && Filter::equals(&filter.role, &self.role)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "role" => Some(SortValue::text(&self.role)),
            "createdAt" | "created_at" | "date" => Some(SortValue::date(&self.created_at)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Name", "Role", "Status", "Description"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.role.clone(),
            self.status.as_str().to_string(),
            self.description.clone(),
        ]
    }
}

impl Simulated for TeamMember {
    fn wire_id(wire: &TeamMemberWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &TeamMemberDraft, now: &str) -> TeamMemberWire {
        TeamMemberWire {
            id,
            name: draft.name.clone(),
            role: draft.role.clone(),
            profile_image: Some(draft.image_url.clone()).filter(|s| !s.is_empty()),
            description: draft.description.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            status: Some(draft.status),
        }
    }

    fn apply_changes(wire: &mut TeamMemberWire, changes: &TeamMemberChanges, now: &str) {
        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.role {
            wire.role = v.clone();
        }
        if let Some(v) = &changes.image_url {
            wire.profile_image = Some(v.clone()).filter(|s| !s.is_empty());
        }
        if let Some(v) = &changes.description {
            wire.description = v.clone();
        }
        if let Some(v) = changes.status {
            wire.status = Some(v);
        }
        wire.updated_at = now.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub date: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilestoneDraft {
    pub date: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilestoneChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Milestone {
    type Wire = MilestoneWire;
    type Draft = MilestoneDraft;
    type Changes = MilestoneChanges;
    type Action = NoAction;

    const NAME: &'static str = "milestones";
    const ENDPOINT: &'static str = "/api/v1/milestones";
    const SORT_KEYS: &'static [&'static str] = &["date", "title"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: MilestoneWire) -> Self {
        Self {
            id: wire.id,
            date: wire.date,
            title: wire.title,
            description: wire.description,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> MilestoneWire {
        MilestoneWire {
            id: self.id.clone(),
            date: self.date.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &MilestoneDraft) -> Result<(), DomainError> {
        require("title", &draft.title)?;
        require("date", &draft.date)
    }

    fn draft_payload(draft: &MilestoneDraft) -> Payload {
        Payload::json(draft)
    }

    fn changes_payload(changes: &MilestoneChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.title, &self.description]) && filter.date_in_range(&self.date)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "date" => Some(SortValue::date(&self.date)),
            "title" => Some(SortValue::text(&self.title)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Date", "Title", "Description"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![self.date.clone(), self.title.clone(), self.description.clone()]
    }
}

impl Simulated for Milestone {
    fn wire_id(wire: &MilestoneWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &MilestoneDraft, now: &str) -> MilestoneWire {
        MilestoneWire {
            id,
            date: draft.date.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_changes(wire: &mut MilestoneWire, changes: &MilestoneChanges, now: &str) {
        if let Some(v) = &changes.date {
            wire.date = v.clone();
        }
        if let Some(v) = &changes.title {
            wire.title = v.clone();
        }
        if let Some(v) = &changes.description {
            wire.description = v.clone();
        }
        wire.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_status_defaults_to_active() {
        let wire: TeamMemberWire = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Rosa",
            "role": "Head Chef",
            "profile_image": "/img/rosa.jpg",
            "description": "Dough whisperer"
        }))
        .unwrap();
        let local = TeamMember::from_wire(wire);
        assert_eq!(local.status, MemberStatus::Active);
        assert_eq!(local.image_url, "/img/rosa.jpg");
        assert_eq!(TeamMember::from_wire(local.to_wire()), local);
    }

    #[test]
    fn test_empty_image_is_sent_as_null() {
        let changes = TeamMemberChanges {
            image_url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            TeamMember::changes_payload(&changes),
            Payload::Json(serde_json::json!({"profile_image": null}))
        );
    }
}
