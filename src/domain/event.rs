use serde::{Deserialize, Serialize};

use crate::domain::{
    require, string_or_number, ActionRoute, DomainError, Filter, Payload, Resource,
    ResourceAction, Simulated, SortValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Snake_case on the way out; camelCase responses are read as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(alias = "maxAttendees")]
    pub max_attendees: u32,
    #[serde(default, alias = "currentAttendees")]
    pub current_attendees: Option<u32>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: String,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organizer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "registrationDeadline", skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, alias = "isPublic", skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub max_attendees: u32,
    pub current_attendees: u32,
    pub image_url: String,
    pub status: EventStatus,
    pub created_at: String,
    pub updated_at: String,
    pub organizer: Option<Organizer>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub registration_deadline: Option<String>,
    pub price: Option<f64>,
    pub is_public: bool,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.current_attendees >= self.max_attendees
    }

    pub fn seats_left(&self) -> u32 {
        self.max_attendees.saturating_sub(self.current_attendees)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub max_attendees: u32,
    pub image_url: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    Register { id: String, attendee: Attendee },
}

impl ResourceAction for EventAction {
    fn route(&self) -> ActionRoute {
        match self {
            EventAction::Register { id, .. } => ActionRoute::Item {
                id: id.clone(),
                path: "register",
            },
        }
    }

    fn payload(&self) -> Payload {
        match self {
            EventAction::Register { attendee, .. } => Payload::json(attendee),
        }
    }
}

impl Resource for Event {
    type Wire = EventWire;
    type Draft = EventDraft;
    type Changes = EventChanges;
    type Action = EventAction;

    const NAME: &'static str = "events";
    const ENDPOINT: &'static str = "/api/v1/events";
    const SORT_KEYS: &'static [&'static str] = &["title", "date", "location", "attendees", "currentAttendees", "price", "createdAt", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: EventWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            date: wire.date,
            time: wire.time,
            location: wire.location,
            max_attendees: wire.max_attendees,
            current_attendees: wire.current_attendees.unwrap_or(0),
            image_url: wire.image_url,
            status: wire.status,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            organizer: wire.organizer,
            category: wire.category,
            tags: wire.tags,
            registration_deadline: wire.registration_deadline,
            price: wire.price,
            is_public: wire.is_public.unwrap_or(true),
        }
    }

    fn to_wire(&self) -> EventWire {
        EventWire {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            location: self.location.clone(),
            max_attendees: self.max_attendees,
            current_attendees: Some(self.current_attendees),
            image_url: self.image_url.clone(),
            status: self.status,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            organizer: self.organizer.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            registration_deadline: self.registration_deadline.clone(),
            price: self.price,
            is_public: Some(self.is_public),
        }
    }

    fn validate_draft(draft: &EventDraft) -> Result<(), DomainError> {
        require("title", &draft.title)?;
        require("date", &draft.date)?;
        if draft.title.chars().count() > 100 {
            return Err(DomainError::validation("title must be at most 100 characters"));
        }
        if draft.max_attendees == 0 {
            return Err(DomainError::validation("max attendees must be positive"));
        }
        if draft.price.is_some_and(|p| p < 0.0) {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(())
    }

    fn validate_changes(changes: &EventChanges) -> Result<(), DomainError> {
        if changes.max_attendees == Some(0) {
            return Err(DomainError::validation("max attendees must be positive"));
        }
        if changes.price.is_some_and(|p| p < 0.0) {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(())
    }

    fn draft_payload(draft: &EventDraft) -> Payload {
        Payload::json(draft)
    }

    fn changes_payload(changes: &EventChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.title, &self.description, &self.location])
            && Filter::equals(&filter.status, self.status.as_str())
            && filter
                .category
                .as_deref()
                .map_or(true, |c| self.category.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(c)))
            && filter.tags.iter().all(|t| self.tags.iter().any(|own| own.eq_ignore_ascii_case(t)))
            && filter.date_in_range(&self.date)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "title" => Some(SortValue::text(&self.title)),
            "date" => Some(SortValue::date(&self.date)),
            "location" => Some(SortValue::text(&self.location)),
            "attendees" | "currentAttendees" => Some(SortValue::Number(self.current_attendees as f64)),
            "price" => Some(SortValue::Number(self.price.unwrap_or(0.0))),
            "createdAt" | "created_at" => Some(SortValue::date(&self.created_at)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Title", "Date", "Time", "Location", "Attendees", "Status"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.date.clone(),
            self.time.clone(),
            self.location.clone(),
            format!("{}/{}", self.current_attendees, self.max_attendees),
            self.status.as_str().to_string(),
        ]
    }
}

impl Simulated for Event {
    fn wire_id(wire: &EventWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &EventDraft, now: &str) -> EventWire {
        EventWire {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            date: draft.date.clone(),
            time: draft.time.clone(),
            location: draft.location.clone(),
            max_attendees: draft.max_attendees,
            current_attendees: Some(0),
            image_url: draft.image_url.clone(),
            status: draft.status,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            organizer: None,
            category: draft.category.clone(),
            tags: draft.tags.clone(),
            registration_deadline: draft.registration_deadline.clone(),
            price: draft.price,
            is_public: Some(draft.is_public),
        }
    }

    fn apply_changes(wire: &mut EventWire, changes: &EventChanges, now: &str) {
        if let Some(v) = &changes.title {
            wire.title = v.clone();
        }
        if let Some(v) = &changes.description {
            wire.description = v.clone();
        }
        if let Some(v) = &changes.date {
            wire.date = v.clone();
        }
        if let Some(v) = &changes.time {
            wire.time = v.clone();
        }
        if let Some(v) = &changes.location {
            wire.location = v.clone();
        }
        if let Some(v) = changes.max_attendees {
            wire.max_attendees = v;
        }
        if let Some(v) = &changes.image_url {
            wire.image_url = v.clone();
        }
        if let Some(v) = changes.status {
            wire.status = v;
        }
        if let Some(v) = &changes.category {
            wire.category = Some(v.clone());
        }
        if let Some(v) = &changes.tags {
            wire.tags = v.clone();
        }
        if let Some(v) = &changes.registration_deadline {
            wire.registration_deadline = Some(v.clone());
        }
        if let Some(v) = changes.price {
            wire.price = Some(v);
        }
        if let Some(v) = changes.is_public {
            wire.is_public = Some(v);
        }
        wire.updated_at = now.to_string();
    }

    fn apply_action(wire: &mut EventWire, action: &EventAction, now: &str) -> Result<(), DomainError> {
        match action {
            EventAction::Register { .. } => {
                let current = wire.current_attendees.unwrap_or(0);
                if current >= wire.max_attendees {
                    return Err(DomainError::EventFull {
                        id: wire.id.clone(),
                        max: wire.max_attendees,
                    });
                }
                wire.current_attendees = Some(current + 1);
                wire.updated_at = now.to_string();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(current: u32, max: u32) -> EventWire {
        serde_json::from_value(serde_json::json!({
            "id": "2",
            "title": "School Fundraiser Pizza Night",
            "date": "2024-03-26",
            "time": "18:00",
            "location": "Lincoln High School",
            "max_attendees": max,
            "current_attendees": current,
            "status": "upcoming",
            "tags": ["school", "fundraiser"],
            "price": 15.0,
            "is_public": true
        }))
        .unwrap()
    }

    #[test]
    fn test_event_round_trip() {
        let local = Event::from_wire(wire(145, 200));
        assert_eq!(local.seats_left(), 55);
        assert_eq!(Event::from_wire(local.to_wire()), local);
    }

    #[test]
    fn test_camel_case_event_decodes() {
        let wire: EventWire = serde_json::from_value(serde_json::json!({
            "id": "4",
            "title": "Dough Workshop",
            "date": "2030-05-01",
            "maxAttendees": 12,
            "currentAttendees": 12,
            "imageUrl": "/img/dough.jpg",
            "createdAt": "2024-01-01T00:00:00Z",
            "registrationDeadline": "2030-04-28",
            "isPublic": false
        }))
        .unwrap();
        let local = Event::from_wire(wire);

        assert!(local.is_full());
        assert_eq!(local.image_url, "/img/dough.jpg");
        assert_eq!(local.registration_deadline.as_deref(), Some("2030-04-28"));
        assert!(!local.is_public);
        assert_eq!(Event::from_wire(local.to_wire()), local);
    }

    #[test]
    fn test_register_rejects_full_event() {
        let mut full = wire(200, 200);
        let action = EventAction::Register {
            id: "2".into(),
            attendee: Attendee {
                name: "Gina".into(),
                email: "gina@example.com".into(),
            },
        };
        let err = Event::apply_action(&mut full, &action, "now").unwrap_err();
        assert!(matches!(err, DomainError::EventFull { max: 200, .. }));
        assert_eq!(full.current_attendees, Some(200));

        let mut open = wire(10, 200);
        Event::apply_action(&mut open, &action, "now").unwrap();
        assert_eq!(open.current_attendees, Some(11));
    }

    #[test]
    fn test_tag_filter_requires_every_tag() {
        let local = Event::from_wire(wire(0, 10));
        assert!(local.matches(&Filter::new().tag("school")));
        assert!(!local.matches(&Filter::new().tag("school").tag("volunteer")));
    }
}
