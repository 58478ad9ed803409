use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

use pne_admin::application::{AuthGate, GalleryStore, ResourceStore};
use pne_admin::domain::{
    Attendee, Contact, DomainError, Event, Filter, GalleryImage, LocationDraft, LoginRequest, Location,
    Notification, Upload, User, UserChanges,
};
use pne_admin::infrastructure::adapters::http::{HttpAuthProvider, HttpBackend};
use pne_admin::infrastructure::adapters::memory::MemoryAuthProvider;
use pne_admin::infrastructure::storage::MemoryCredentialStore;
use pne_admin::ports::{CredentialSource, CredentialStore};

fn gate_with_token(token: Option<&str>) -> (Arc<AuthGate>, Arc<MemoryCredentialStore>) {
    let credentials = Arc::new(MemoryCredentialStore::default());
    if let Some(token) = token {
        credentials.save(token).unwrap();
    }
    let gate = Arc::new(AuthGate::new(
        Arc::new(MemoryAuthProvider::default()),
        credentials.clone(),
    ));
    (gate, credentials)
}

fn store<R: pne_admin::domain::Resource>(url: &str, gate: &Arc<AuthGate>) -> ResourceStore<R> {
    let credentials: Arc<dyn CredentialSource> = gate.clone();
    ResourceStore::new(Arc::new(HttpBackend::<R>::new(url, credentials).unwrap()))
}

const LOCATIONS: &str = r#"{"data": [
    {"id": 1, "name": "Downtown", "street": "120 Pine St", "city": "Seattle", "state": "WA", "zip": "98101", "status": "1"},
    {"id": 2, "name": "Pearl", "street": "1120 NW Couch St", "city": "Portland", "state": "OR", "zip": "97209", "status": 0}
]}"#;

#[tokio::test]
async fn test_fetch_sends_bearer_and_refilters_locally() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/admin/locations")
        .match_header("authorization", "Bearer tok-1")
        .match_query(Matcher::UrlEncoded("state".into(), "WA".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        // The server ignores the filter and sends everything back.
        .with_body(LOCATIONS)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-1"));
    let locations = store::<Location>(&server.url(), &gate);
    let fetched = locations.fetch_all(&Filter::new().state("WA")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].address, "120 Pine St");
    assert!(fetched[0].is_active);
    assert_eq!(locations.meta().total, 1);
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/admin/locations")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(None);
    let locations = store::<Location>(&server.url(), &gate);
    let err = locations.fetch_all(&Filter::new()).await.unwrap_err();

    assert_eq!(err, DomainError::MissingCredential);
    assert!(!locations.status().loading);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_keeps_collection_and_ends_session() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("POST", "/api/v1/login")
        .match_body(Matcher::PartialJson(json!({"email": "admin@pne.test"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "tok-9", "user": {"id": 1, "name": "Admin", "email": "admin@pne.test"}}"#)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/api/v1/admin/locations")
        .match_header("authorization", "Bearer tok-9")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(LOCATIONS)
        .expect(1)
        .create_async()
        .await;
    let _rejected = server
        .mock("GET", "/api/v1/admin/locations")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message": "Unauthenticated."}"#)
        .create_async()
        .await;

    let credentials = Arc::new(MemoryCredentialStore::default());
    let gate = Arc::new(AuthGate::new(
        Arc::new(HttpAuthProvider::new(server.url()).unwrap()),
        credentials.clone(),
    ));
    gate.login(LoginRequest::new("admin@pne.test", "password123"))
        .await
        .unwrap();
    assert!(gate.is_authenticated());

    let locations = store::<Location>(&server.url(), &gate);
    locations.fetch_all(&Filter::new()).await.unwrap();
    assert_eq!(locations.len(), 2);
    ok.assert_async().await;

    let err = locations.fetch_all(&Filter::new()).await.unwrap_err();
    assert_eq!(err, DomainError::Unauthorized("Unauthenticated.".into()));

    let status = locations.status();
    assert!(!status.loading);
    assert_eq!(
        status.error.as_deref(),
        Some("Failed to fetch locations: Unauthorized: Unauthenticated.")
    );
    assert_eq!(locations.len(), 2);
    assert!(credentials.load().unwrap().is_none());
    assert!(!gate.is_authenticated());
}

#[tokio::test]
async fn test_paginated_users_and_multipart_update() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v1/manageuser")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"current_page": 1, "per_page": 10, "total": 12, "last_page": 2,
                "data": [{"id": 5, "name": "Ana Lima", "email": "ana@pne.test", "role": "staff"}]}"#,
        )
        .create_async()
        .await;
    let update = server
        .mock("POST", "/api/v1/manageuser/5")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="_method"\r\n\r\nPUT"#.into()),
            Matcher::Regex(r#"name="role"\r\n\r\nmanager"#.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"user": {"id": 5, "name": "Ana Lima", "email": "ana@pne.test", "role": "manager"}}"#)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-2"));
    let users = store::<User>(&server.url(), &gate);
    users.fetch_all(&Filter::new()).await.unwrap();

    let meta = users.meta();
    assert_eq!(meta.total, 12);
    assert_eq!(meta.total_pages, 2);

    let updated = users
        .update(
            "5",
            UserChanges {
                role: Some("manager".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    update.assert_async().await;
    assert_eq!(updated.role, "manager");
    assert_eq!(users.find("5").unwrap().role, "manager");
}

#[tokio::test]
async fn test_mark_as_read_with_acknowledgement_only() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v1/notifications")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 3, "message": "New order", "is_read": 0}, {"id": 4, "message": "Backup", "is_read": "1"}]"#)
        .create_async()
        .await;
    let mark = server
        .mock("POST", "/api/v1/notifications/3/mark-as-read")
        .with_status(200)
        .with_body(r#"{"message": "Notification marked as read"}"#)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-3"));
    let notifications = store::<Notification>(&server.url(), &gate);
    notifications.fetch_all(&Filter::new()).await.unwrap();
    assert_eq!(notifications.counts().unread, 1);

    notifications.mark_as_read("3").await.unwrap();
    mark.assert_async().await;
    assert_eq!(notifications.counts().unread, 0);
}

#[tokio::test]
async fn test_register_attendee_checks_capacity_first() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v1/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "title": "Dough Workshop", "date": "2030-06-14", "max_attendees": 10, "current_attendees": 5},
                {"id": 2, "title": "Tasting", "date": "2030-07-02", "max_attendees": 2, "current_attendees": 2}]"#,
        )
        .create_async()
        .await;
    let register_open = server
        .mock("POST", "/api/v1/events/1/register")
        .match_body(Matcher::PartialJson(json!({"email": "guest@pne.test"})))
        .with_status(200)
        .with_body(r#"{"data": {"id": 1, "title": "Dough Workshop", "date": "2030-06-14", "max_attendees": 10, "current_attendees": 6}}"#)
        .create_async()
        .await;
    let register_full = server
        .mock("POST", "/api/v1/events/2/register")
        .expect(0)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-4"));
    let events = store::<Event>(&server.url(), &gate);
    events.fetch_all(&Filter::new()).await.unwrap();

    let guest = Attendee {
        name: "Guest".into(),
        email: "guest@pne.test".into(),
    };
    let event = events.register_attendee("1", guest.clone()).await.unwrap().unwrap();
    assert_eq!(event.current_attendees, 6);

    let err = events.register_attendee("2", guest).await.unwrap_err();
    assert!(matches!(err, DomainError::EventFull { max: 2, .. }));
    assert!(err.to_string().starts_with("Event is full"));

    register_open.assert_async().await;
    register_full.assert_async().await;
}

#[tokio::test]
async fn test_gallery_upload_is_multipart_and_prepended() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v1/media")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 1, "name": "oven.jpg", "size": 2048, "type": "image/jpeg"}]"#)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/api/v1/media")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::Regex(r#"name="file"; filename="patio.png""#.into()))
        .with_status(201)
        .with_body(r#"{"data": {"id": 2, "name": "patio.png", "size": 1048576, "type": "image/png", "tags": ["patio"]}}"#)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-5"));
    let credentials: Arc<dyn CredentialSource> = gate.clone();
    let gallery = GalleryStore::new(Arc::new(
        HttpBackend::<GalleryImage>::new(server.url(), credentials).unwrap(),
    ));
    gallery.images().fetch_all(&Filter::new()).await.unwrap();

    let image = gallery
        .upload(
            Upload {
                file_name: "patio.png".into(),
                mime_type: "image/png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
            vec!["patio".into()],
        )
        .await
        .unwrap();

    upload.assert_async().await;
    assert_eq!(image.size, "1.0 MB");
    assert_eq!(gallery.images().items()[0].id, "2");
}

#[tokio::test]
async fn test_delete_of_missing_record_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let _delete = server
        .mock("DELETE", "/api/v1/locations/77")
        .with_status(404)
        .with_body(r#"{"message": "Location not found"}"#)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-6"));
    let locations = store::<Location>(&server.url(), &gate);
    locations.delete("77").await.unwrap();
    assert!(locations.status().error.is_none());
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _get = server
        .mock("GET", "/api/v1/locations/9")
        .with_status(500)
        .with_body(r#"{"message": "Database unavailable"}"#)
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-7"));
    let locations = store::<Location>(&server.url(), &gate);
    let err = locations.fetch_by_id("9").await.unwrap_err();

    assert_eq!(
        err,
        DomainError::Http {
            status: 500,
            message: "Database unavailable".into()
        }
    );
}

#[tokio::test]
async fn test_locations_list_from_admin_path_and_write_to_collection() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/v1/admin/locations")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(LOCATIONS)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/locations")
        .with_status(201)
        .with_body(
            r#"{"data": {"id": 3, "name": "Harbor", "street": "1 Dock St", "city": "Tacoma", "state": "WA", "zip": "98402", "status": "1"}}"#,
        )
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-8"));
    let locations = store::<Location>(&server.url(), &gate);
    locations.fetch_all(&Filter::new()).await.unwrap();
    let created = locations
        .create(LocationDraft {
            name: "Harbor".into(),
            address: "1 Dock St".into(),
            city: "Tacoma".into(),
            state: "WA".into(),
            zip_code: "98402".into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();

    list.assert_async().await;
    create.assert_async().await;
    assert_eq!(created.id, "3");
    assert_eq!(locations.len(), 3);
}

#[tokio::test]
async fn test_camel_case_contacts_keep_dates_for_range_filters() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v1/contacts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"id": "5", "name": "Ana", "email": "ana@example.com", "status": "completed",
                "priority": "low", "type": "general",
                "receivedDate": "2024-03-20T10:00:00Z", "lastUpdated": "2024-03-21T08:00:00Z",
                "response": {"text": "Thanks!", "date": "2024-03-21T08:00:00Z", "respondentName": "Marco"}},
               {"id": "6", "name": "Bo", "email": "bo@example.com",
                "receivedDate": "2024-04-02T10:00:00Z"}]"#,
        )
        .create_async()
        .await;

    let (gate, _) = gate_with_token(Some("tok-9"));
    let contacts = store::<Contact>(&server.url(), &gate);
    let march = Filter::new().between(
        NaiveDate::from_ymd_opt(2024, 3, 1),
        NaiveDate::from_ymd_opt(2024, 3, 31),
    );
    let fetched = contacts.fetch_all(&march).await.unwrap();

    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].last_updated.as_deref(), Some("2024-03-21T08:00:00Z"));
    assert_eq!(
        fetched[0].response.as_ref().map(|r| r.respondent_name.as_str()),
        Some("Marco")
    );
}
