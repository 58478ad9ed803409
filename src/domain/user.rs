use serde::{Deserialize, Serialize};

use crate::domain::{
    require, string_or_number, DomainError, Filter, FormPart, NoAction, Payload, Resource,
    Simulated, SortValue, UpdateMethod, Upload,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A dashboard account managed by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub role: String,
    pub email_verified_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    /// Accounts count as active once their email is verified.
    pub fn is_active(&self) -> bool {
        self.email_verified_at.is_some()
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active() {
            "Active"
        } else {
            "Inactive"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub avatar: Option<Upload>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<Upload>,
}

const AVATAR_FIELD: &str = "image";

fn avatar_path(upload: &Upload) -> String {
    format!("/storage/users/{}", upload.file_name)
}

impl Resource for User {
    type Wire = UserWire;
    type Draft = UserDraft;
    type Changes = UserChanges;
    type Action = NoAction;

    const NAME: &'static str = "users";
    const ENDPOINT: &'static str = "/api/v1/manageuser";
    const SORT_KEYS: &'static [&'static str] = &["name", "email", "role", "createdAt", "created_at", "date"];
    const UPDATE_METHOD: UpdateMethod = UpdateMethod::Post;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: UserWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            image_url: wire.image,
            role: wire.role,
            email_verified_at: wire.email_verified_at,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> UserWire {
        UserWire {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image_url.clone(),
            role: self.role.clone(),
            email_verified_at: self.email_verified_at.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &UserDraft) -> Result<(), DomainError> {
        require("name", &draft.name)?;
        require("email", &draft.email)?;
        if draft.password.len() < 8 {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }
        Ok(())
    }

    fn validate_changes(changes: &UserChanges) -> Result<(), DomainError> {
        if let Some(password) = &changes.password {
            if password.len() < 8 {
                return Err(DomainError::validation(
                    "password must be at least 8 characters",
                ));
            }
        }
        Ok(())
    }

    fn draft_payload(draft: &UserDraft) -> Payload {
        let mut parts = vec![
            FormPart::text("name", &draft.name),
            FormPart::text("email", &draft.email),
            FormPart::text("password", &draft.password),
            FormPart::text("role", &draft.role),
        ];
        if let Some(avatar) = &draft.avatar {
            parts.push(FormPart::file(AVATAR_FIELD, avatar.clone()));
        }
        Payload::Multipart(parts)
    }

    fn changes_payload(changes: &UserChanges) -> Payload {
        let mut parts = vec![FormPart::text("_method", "PUT")];
        let fields = [
            ("name", &changes.name),
            ("email", &changes.email),
            ("password", &changes.password),
            ("role", &changes.role),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                parts.push(FormPart::text(name, value));
            }
        }
        if let Some(avatar) = &changes.avatar {
            parts.push(FormPart::file(AVATAR_FIELD, avatar.clone()));
        }
        Payload::Multipart(parts)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.name, &self.email])
            && Filter::equals(&filter.role, &self.role)
            && Filter::equals(&filter.status, if self.is_active() { "active" } else { "inactive" })
            && filter.is_active.map_or(true, |active| self.is_active() == active)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "email" => Some(SortValue::text(&self.email)),
            "role" => Some(SortValue::text(&self.role)),
            "createdAt" | "created_at" | "date" => {
                Some(SortValue::date(self.created_at.as_deref().unwrap_or_default()))
            }
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Name", "Email", "Role", "Status", "Last Login"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.role.clone(),
            self.status_label().to_string(),
            self.updated_at.clone().unwrap_or_default(),
        ]
    }
}

impl Simulated for User {
    fn wire_id(wire: &UserWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &UserDraft, now: &str) -> UserWire {
        UserWire {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            image: draft.avatar.as_ref().map(avatar_path),
            role: draft.role.clone(),
            email_verified_at: None,
            created_at: Some(now.to_string()),
            updated_at: Some(now.to_string()),
        }
    }

    fn apply_changes(wire: &mut UserWire, changes: &UserChanges, now: &str) {
        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.email {
            wire.email = v.clone();
        }
        if let Some(v) = &changes.role {
            wire.role = v.clone();
        }
        if let Some(avatar) = &changes.avatar {
            wire.image = Some(avatar_path(avatar));
        }
        wire.updated_at = Some(now.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormValue;

    #[test]
    fn test_user_mapping_and_status() {
        let wire: UserWire = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Admin",
            "email": "admin@pne.test",
            "image": null,
            "role": "Admin",
            "email_verified_at": "2024-01-01T00:00:00.000000Z"
        }))
        .unwrap();
        let local = User::from_wire(wire);
        assert!(local.is_active());
        assert_eq!(local.image_url, None);
        assert_eq!(User::from_wire(local.to_wire()), local);
        assert!(local.matches(&Filter::new().status("active").role("admin")));
    }

    #[test]
    fn test_update_is_spoofed_multipart() {
        let changes = UserChanges {
            role: Some("Manager".into()),
            avatar: Some(Upload {
                file_name: "me.png".into(),
                mime_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            }),
            ..Default::default()
        };
        let Payload::Multipart(parts) = User::changes_payload(&changes) else {
            panic!("expected multipart");
        };
        assert_eq!(parts[0], FormPart::text("_method", "PUT"));
        assert_eq!(parts[1], FormPart::text("role", "Manager"));
        assert!(matches!(parts[2].value, FormValue::File(_)));
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_short_password_rejected() {
        let draft = UserDraft {
            name: "New".into(),
            email: "new@pne.test".into(),
            password: "short".into(),
            role: "User".into(),
            avatar: None,
        };
        assert!(User::validate_draft(&draft).is_err());
    }
}
