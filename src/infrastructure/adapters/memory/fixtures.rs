//! Demo records for offline mode.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::domain::{
    ContactWire, DomainError, EventWire, FeedbackWire, GalleryImageWire, InquiryWire, LocationWire,
    MilestoneWire, NotificationWire, TeamMemberWire, UserWire,
};

pub const DEMO_NAME: &str = "Demo Admin";
pub const DEMO_EMAIL: &str = "admin@pne.local";
pub const DEMO_PASSWORD: &str = "password123";

fn records<W: DeserializeOwned>(value: Value) -> Result<Vec<W>, DomainError> {
    serde_json::from_value(value).map_err(|e| DomainError::Decode(format!("fixture: {}", e)))
}

pub fn locations() -> Result<Vec<LocationWire>, DomainError> {
    records(json!([
        {
            "id": 1, "name": "Downtown", "street": "120 Pine St", "city": "Seattle",
            "state": "WA", "zip": "98101", "status": "1",
            "latitude": "47.6101", "longitude": "-122.3421",
            "description": "Flagship wood-fired kitchen",
            "created_at": "2024-01-05T10:00:00Z", "updated_at": "2024-03-01T09:30:00Z"
        },
        {
            "id": 2, "name": "Capitol Hill", "street": "801 E Pike St", "city": "Seattle",
            "state": "WA", "zip": "98122", "status": "1",
            "created_at": "2024-02-11T10:00:00Z", "updated_at": "2024-02-11T10:00:00Z"
        },
        {
            "id": 3, "name": "Pearl District", "street": "1120 NW Couch St", "city": "Portland",
            "state": "OR", "zip": "97209", "status": "0", "lc_number": "OR-5521",
            "created_at": "2024-04-20T10:00:00Z", "updated_at": "2024-05-02T16:45:00Z"
        }
    ]))
}

pub fn contacts() -> Result<Vec<ContactWire>, DomainError> {
    records(json!([
        {
            "id": 1, "name": "Maria Lopez", "email": "maria@example.com", "phone": "555-0101",
            "subject": "Catering for 40", "message": "Do you cater office lunches?",
            "status": "pending", "priority": "high", "type": "general",
            "received_date": "2024-05-10T14:20:00Z",
            "timeline": [
                { "date": "2024-05-10T14:20:00Z", "action": "created" }
            ]
        },
        {
            "id": 2, "name": "Tom Becker", "email": "tom@example.com",
            "subject": "Wrong order", "message": "Received a margherita instead of a diavola.",
            "status": "completed", "priority": "medium", "type": "support",
            "received_date": "2024-05-02T19:05:00Z", "last_updated": "2024-05-03T09:00:00Z",
            "response": {
                "text": "Sorry about that, a credit is on its way.",
                "date": "2024-05-03T09:00:00Z", "respondent_name": "Demo Admin"
            },
            "timeline": [
                { "date": "2024-05-02T19:05:00Z", "action": "created" },
                { "date": "2024-05-03T09:00:00Z", "action": "responded", "user": "Demo Admin" }
            ]
        }
    ]))
}

pub fn feedback() -> Result<Vec<FeedbackWire>, DomainError> {
    records(json!([
        {
            "id": 1, "customer_name": "Ana Ruiz", "email": "ana@example.com", "rating": 5,
            "comment": "Best crust in town.", "status": "Published", "helpful_count": 4,
            "created_at": "2024-05-01T12:00:00Z", "updated_at": "2024-05-01T12:00:00Z"
        },
        {
            "id": 2, "customer_name": "Lee Park", "rating": 3,
            "comment": "Good pizza, slow delivery.", "status": "Pending",
            "created_at": "2024-05-08T20:15:00Z", "updated_at": "2024-05-08T20:15:00Z"
        }
    ]))
}

pub fn inquiries() -> Result<Vec<InquiryWire>, DomainError> {
    records(json!([
        {
            "id": 1, "name": "Northwind Holdings", "email": "deals@northwind.test",
            "info": "Interested in a franchise in Boise.", "status": "New",
            "created_at": "2024-05-12T08:00:00Z"
        },
        {
            "id": 2, "name": "Sam Ortiz", "email": "sam@ortiz.test", "phone": "555-0144",
            "info": "Corner lot available for lease.", "status": "In Review",
            "created_at": "2024-04-28T15:30:00Z"
        }
    ]))
}

pub fn users() -> Result<Vec<UserWire>, DomainError> {
    records(json!([
        {
            "id": 1, "name": DEMO_NAME, "email": DEMO_EMAIL, "role": "admin",
            "email_verified_at": "2024-01-01T00:00:00Z", "created_at": "2024-01-01T00:00:00Z"
        },
        {
            "id": 2, "name": "Priya Shah", "email": "priya@pne.local", "role": "editor",
            "created_at": "2024-03-14T11:00:00Z"
        }
    ]))
}

pub fn events() -> Result<Vec<EventWire>, DomainError> {
    records(json!([
        {
            "id": 1, "title": "Dough Workshop", "description": "Hands-on Neapolitan dough class.",
            "date": "2030-06-14", "time": "18:00", "location": "Downtown",
            "max_attendees": 12, "current_attendees": 9, "status": "upcoming",
            "category": "class", "tags": ["workshop", "dough"], "price": 45.0, "is_public": true
        },
        {
            "id": 2, "title": "Summer Tasting", "date": "2030-07-02", "time": "19:30",
            "location": "Capitol Hill", "max_attendees": 20, "current_attendees": 20,
            "status": "upcoming", "tags": ["tasting"]
        }
    ]))
}

pub fn gallery() -> Result<Vec<GalleryImageWire>, DomainError> {
    records(json!([
        {
            "id": 1, "name": "oven.jpg", "url": "/storage/media/oven.jpg",
            "file_path": "media/oven.jpg", "thumbnail_path": "media/thumbs/oven.jpg",
            "size": 1258291, "type": "image/jpeg", "width": 1920, "height": 1080,
            "uploaded_at": "2024-04-01T10:00:00Z", "tags": ["kitchen", "oven"]
        },
        {
            "id": 2, "name": "storefront.png", "url": "/storage/media/storefront.png",
            "file_path": "media/storefront.png", "size": 524288, "type": "image/png",
            "uploaded_at": "2024-04-09T10:00:00Z", "tags": ["exterior"]
        }
    ]))
}

pub fn notifications() -> Result<Vec<NotificationWire>, DomainError> {
    records(json!([
        {
            "id": 1, "message": "New contact from Maria Lopez", "is_read": 0,
            "created_at_message": "2 hours ago", "created_at": "2024-05-10T14:20:00Z"
        },
        {
            "id": 2, "message": "Feedback awaiting review", "is_read": 0,
            "created_at_message": "1 day ago", "created_at": "2024-05-08T20:15:00Z"
        },
        {
            "id": 3, "message": "Weekly backup completed", "is_read": 1,
            "read_at": "2024-05-06T08:00:00Z",
            "created_at_message": "5 days ago", "created_at": "2024-05-05T03:00:00Z"
        }
    ]))
}

pub fn team_members() -> Result<Vec<TeamMemberWire>, DomainError> {
    records(json!([
        { "id": 1, "name": "Giulia Conti", "role": "Head Chef", "description": "Trained in Naples." },
        { "id": 2, "name": "Marcus Hill", "role": "Operations", "status": "inactive" }
    ]))
}

pub fn milestones() -> Result<Vec<MilestoneWire>, DomainError> {
    records(json!([
        { "id": 1, "date": "2019-03-01", "title": "First oven lit", "description": "Downtown opens." },
        { "id": 2, "date": "2022-09-15", "title": "Third location", "description": "Portland opens." }
    ]))
}
