use serde::{Deserialize, Serialize};

use crate::domain::{
    require, string_or_number, ActionRoute, DomainError, Filter, Payload, Resource,
    ResourceAction, Simulated, SortValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedbackStatus {
    Published,
    #[default]
    Pending,
    Archived,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Published => "Published",
            FeedbackStatus::Pending => "Pending",
            FeedbackStatus::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub status: FeedbackStatus,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub rating: u8,
    pub comment: String,
    pub status: FeedbackStatus,
    pub helpful_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackDraft {
    pub customer_name: String,
    pub email: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FeedbackStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackAction {
    /// `POST /{id}/helpful`
    Helpful { id: String, is_helpful: bool },
}

impl ResourceAction for FeedbackAction {
    fn route(&self) -> ActionRoute {
        match self {
            FeedbackAction::Helpful { id, .. } => ActionRoute::Item {
                id: id.clone(),
                path: "helpful",
            },
        }
    }

    fn payload(&self) -> Payload {
        match self {
            FeedbackAction::Helpful { is_helpful, .. } => {
                Payload::Json(serde_json::json!({ "isHelpful": is_helpful }))
            }
        }
    }
}

fn validate_rating(rating: u8) -> Result<(), DomainError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "rating must be between 1 and 5, got {}",
            rating
        )))
    }
}

impl Resource for Feedback {
    type Wire = FeedbackWire;
    type Draft = FeedbackDraft;
    type Changes = FeedbackChanges;
    type Action = FeedbackAction;

    const NAME: &'static str = "feedback";
    const ENDPOINT: &'static str = "/api/v1/feedback/admin";
    const SORT_KEYS: &'static [&'static str] = &["customerName", "customer_name", "name", "rating", "status", "createdAt", "created_at", "date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: FeedbackWire) -> Self {
        Self {
            id: wire.id,
            customer_name: wire.customer_name,
            email: wire.email,
            rating: wire.rating,
            comment: wire.comment,
            status: wire.status,
            helpful_count: wire.helpful_count,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> FeedbackWire {
        FeedbackWire {
            id: self.id.clone(),
            customer_name: self.customer_name.clone(),
            email: self.email.clone(),
            rating: self.rating,
            comment: self.comment.clone(),
            status: self.status,
            helpful_count: self.helpful_count,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &FeedbackDraft) -> Result<(), DomainError> {
        require("customer name", &draft.customer_name)?;
        validate_rating(draft.rating)
    }

    fn validate_changes(changes: &FeedbackChanges) -> Result<(), DomainError> {
        match changes.rating {
            Some(rating) => validate_rating(rating),
            None => Ok(()),
        }
    }

    fn draft_payload(draft: &FeedbackDraft) -> Payload {
        Payload::json(&serde_json::json!({
            "customer_name": draft.customer_name,
            "email": draft.email,
            "rating": draft.rating,
            "comment": draft.comment,
        }))
    }

    fn changes_payload(changes: &FeedbackChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.customer_name, &self.email, &self.comment])
            && Filter::equals(&filter.status, self.status.as_str())
            && filter.rating.map_or(true, |r| self.rating == r)
            && filter.date_in_range(&self.created_at)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "customerName" | "customer_name" | "name" => Some(SortValue::text(&self.customer_name)),
            "rating" => Some(SortValue::Number(self.rating as f64)),
            "status" => Some(SortValue::text(self.status.as_str())),
            "createdAt" | "created_at" | "date" => Some(SortValue::date(&self.created_at)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Customer", "Email", "Rating", "Comment", "Status", "Date"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.customer_name.clone(),
            self.email.clone(),
            self.rating.to_string(),
            self.comment.clone(),
            self.status.as_str().to_string(),
            self.created_at.clone(),
        ]
    }
}

impl Simulated for Feedback {
    fn wire_id(wire: &FeedbackWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &FeedbackDraft, now: &str) -> FeedbackWire {
        FeedbackWire {
            id,
            customer_name: draft.customer_name.clone(),
            email: draft.email.clone(),
            rating: draft.rating,
            comment: draft.comment.clone(),
            status: FeedbackStatus::Pending,
            helpful_count: 0,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_changes(wire: &mut FeedbackWire, changes: &FeedbackChanges, now: &str) {
        if let Some(v) = &changes.customer_name {
            wire.customer_name = v.clone();
        }
        if let Some(v) = &changes.email {
            wire.email = v.clone();
        }
        if let Some(v) = changes.rating {
            wire.rating = v;
        }
        if let Some(v) = &changes.comment {
            wire.comment = v.clone();
        }
        if let Some(v) = changes.status {
            wire.status = v;
        }
        wire.updated_at = now.to_string();
    }

    fn apply_action(
        wire: &mut FeedbackWire,
        action: &FeedbackAction,
        now: &str,
    ) -> Result<(), DomainError> {
        match action {
            FeedbackAction::Helpful { is_helpful, .. } => {
                if *is_helpful {
                    wire.helpful_count += 1;
                } else {
                    wire.helpful_count = wire.helpful_count.saturating_sub(1);
                }
                wire.updated_at = now.to_string();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_mapping() {
        let wire: FeedbackWire = serde_json::from_value(serde_json::json!({
            "id": 11,
            "customer_name": "Luigi",
            "email": "l@example.com",
            "rating": 4,
            "comment": "Great crust",
            "status": "Published",
            "created_at": "2024-02-01 12:00:00",
            "updated_at": "2024-02-01 12:00:00"
        }))
        .unwrap();
        let local = Feedback::from_wire(wire);
        assert_eq!(local.customer_name, "Luigi");
        assert_eq!(local.status, FeedbackStatus::Published);
        assert_eq!(Feedback::from_wire(local.to_wire()), local);

        let json = serde_json::to_value(&local).unwrap();
        assert_eq!(json["customerName"], "Luigi");
    }

    #[test]
    fn test_rating_bounds() {
        let mut draft = FeedbackDraft {
            customer_name: "Mario".into(),
            rating: 0,
            ..Default::default()
        };
        assert!(Feedback::validate_draft(&draft).is_err());
        draft.rating = 5;
        assert!(Feedback::validate_draft(&draft).is_ok());
        assert!(Feedback::validate_changes(&FeedbackChanges {
            rating: Some(6),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_helpful_route() {
        let action = FeedbackAction::Helpful {
            id: "9".into(),
            is_helpful: true,
        };
        assert_eq!(
            action.route(),
            ActionRoute::Item {
                id: "9".into(),
                path: "helpful"
            }
        );
        assert_eq!(action.payload(), Payload::Json(serde_json::json!({"isHelpful": true})));
    }
}
