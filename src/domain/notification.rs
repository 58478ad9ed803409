use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    string_or_number, ActionRoute, DomainError, Filter, Payload, Resource, ResourceAction,
    Simulated, SortValue,
};

/// Accepts `0`/`1` or a JSON boolean.
fn read_flag<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Int(u8),
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Int(n) => u8::from(n != 0),
        Flag::Bool(b) => u8::from(b),
        Flag::Text(s) => u8::from(matches!(s.trim(), "1" | "true")),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub created_at_message: String,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default, deserialize_with = "read_flag")]
    pub is_read: u8,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,
    /// Server-rendered "5 minutes ago" style label.
    pub relative_time: String,
    pub read_at: Option<String>,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Notifications are produced by the backend; the dashboard never drafts or edits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationInput {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    MarkAsRead(String),
    MarkAllAsRead,
}

impl ResourceAction for NotificationAction {
    fn route(&self) -> ActionRoute {
        match self {
            NotificationAction::MarkAsRead(id) => ActionRoute::Item {
                id: id.clone(),
                path: "mark-as-read",
            },
            NotificationAction::MarkAllAsRead => ActionRoute::Collection {
                path: "mark-all-read",
            },
        }
    }
}

/// Read/unread tallies over the loaded notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationCounts {
    pub count: usize,
    pub read: usize,
    pub unread: usize,
}

impl NotificationCounts {
    pub fn of(items: &[Notification]) -> Self {
        let read = items.iter().filter(|n| n.is_read).count();
        Self {
            count: items.len(),
            read,
            unread: items.len() - read,
        }
    }
}

impl Resource for Notification {
    type Wire = NotificationWire;
    type Draft = NotificationInput;
    type Changes = NotificationInput;
    type Action = NotificationAction;

    const NAME: &'static str = "notifications";
    const ENDPOINT: &'static str = "/api/v1/notifications";
    const SORT_KEYS: &'static [&'static str] = &["createdAt", "created_at", "date", "message"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: NotificationWire) -> Self {
        Self {
            id: wire.id,
            message: wire.message,
            relative_time: wire.created_at_message,
            read_at: wire.read_at,
            is_read: wire.is_read != 0,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> NotificationWire {
        NotificationWire {
            id: self.id.clone(),
            message: self.message.clone(),
            created_at_message: self.relative_time.clone(),
            read_at: self.read_at.clone(),
            is_read: u8::from(self.is_read),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &NotificationInput) -> Result<(), DomainError> {
        match *draft {}
    }

    fn draft_payload(draft: &NotificationInput) -> Payload {
        match *draft {}
    }

    fn changes_payload(changes: &NotificationInput) -> Payload {
        match *changes {}
    }

    fn matches(&self, filter: &Filter) -> bool {
        let status = if self.is_read { "read" } else { "unread" };
        filter.search_matches(&[&self.message])
            && Filter::equals(&filter.status, status)
            && filter.date_in_range(&self.created_at)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "createdAt" | "created_at" | "date" => Some(SortValue::date(&self.created_at)),
            "message" => Some(SortValue::text(&self.message)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Message", "Read", "Created"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.message.clone(),
            if self.is_read { "yes" } else { "no" }.to_string(),
            self.created_at.clone(),
        ]
    }
}

impl Simulated for Notification {
    fn wire_id(wire: &NotificationWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(_id: String, draft: &NotificationInput, _now: &str) -> NotificationWire {
        match *draft {}
    }

    fn apply_changes(_wire: &mut NotificationWire, changes: &NotificationInput, _now: &str) {
        match *changes {}
    }

    fn apply_action(
        wire: &mut NotificationWire,
        _action: &NotificationAction,
        now: &str,
    ) -> Result<(), DomainError> {
        if wire.is_read == 0 {
            wire.is_read = 1;
            wire.read_at = Some(now.to_string());
            wire.updated_at = now.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_flag_variants() {
        let wire: NotificationWire = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "message": "New inquiry received",
            "created_at_message": "5 minutes ago",
            "read_at": null,
            "is_read": 0,
            "created_at": "2024-03-20T10:00:00Z",
            "updated_at": "2024-03-20T10:00:00Z"
        }))
        .unwrap();
        let local = Notification::from_wire(wire);
        assert!(!local.is_read);
        assert_eq!(local.relative_time, "5 minutes ago");
        assert_eq!(Notification::from_wire(local.to_wire()), local);

        let wire: NotificationWire =
            serde_json::from_value(serde_json::json!({"id": 2, "message": "x", "is_read": true}))
                .unwrap();
        assert_eq!(wire.is_read, 1);
    }

    #[test]
    fn test_counts() {
        let make = |id: &str, read: bool| Notification {
            id: id.into(),
            message: "m".into(),
            relative_time: String::new(),
            read_at: None,
            is_read: read,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let counts = NotificationCounts::of(&[make("1", true), make("2", false), make("3", false)]);
        assert_eq!(counts, NotificationCounts { count: 3, read: 1, unread: 2 });
        assert_eq!(NotificationCounts::of(&[]), NotificationCounts::default());
    }

    #[test]
    fn test_routes() {
        assert_eq!(
            NotificationAction::MarkAllAsRead.route(),
            ActionRoute::Collection { path: "mark-all-read" }
        );
        assert_eq!(
            NotificationAction::MarkAsRead("4".into()).route(),
            ActionRoute::Item { id: "4".into(), path: "mark-as-read" }
        );
    }
}
