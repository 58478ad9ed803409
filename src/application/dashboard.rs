//! Everything one operator session works with: the auth gate, one store per
//! collection, settings, and the export destination.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::application::{
    AuthGate, ContactStore, EventStore, ExportFormat, FeedbackStore, GalleryStore, InquiryStore,
    LocationStore, MilestoneStore, NotificationStore, ResourceStore, SettingsStore,
    TeamMemberStore, UserStore,
};
use crate::domain::{
    Contact, DomainError, Event, Feedback, Filter, GalleryImage, Inquiry, InquiryStatus, Location,
    Milestone, Notification, Resource, TeamMember, User,
};
use crate::ports::{FileSink, ResourceBackend, SettingsRepository};

/// One backend per collection.
pub struct Backends {
    pub locations: Arc<dyn ResourceBackend<Location>>,
    pub contacts: Arc<dyn ResourceBackend<Contact>>,
    pub feedback: Arc<dyn ResourceBackend<Feedback>>,
    pub inquiries: Arc<dyn ResourceBackend<Inquiry>>,
    pub users: Arc<dyn ResourceBackend<User>>,
    pub events: Arc<dyn ResourceBackend<Event>>,
    pub gallery: Arc<dyn ResourceBackend<GalleryImage>>,
    pub notifications: Arc<dyn ResourceBackend<Notification>>,
    pub team_members: Arc<dyn ResourceBackend<TeamMember>>,
    pub milestones: Arc<dyn ResourceBackend<Milestone>>,
}

/// Headline numbers shown on the dashboard landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub locations: usize,
    pub active_locations: usize,
    pub contacts: usize,
    pub pending_contacts: usize,
    pub feedback: usize,
    pub average_rating: f64,
    pub inquiries: usize,
    pub new_inquiries: usize,
    pub users: usize,
    pub events: usize,
    pub upcoming_events: usize,
    pub images: usize,
    pub unread_notifications: usize,
    pub team_members: usize,
    pub milestones: usize,
}

pub struct Dashboard {
    pub auth: Arc<AuthGate>,
    pub locations: LocationStore,
    pub contacts: ContactStore,
    pub feedback: FeedbackStore,
    pub inquiries: InquiryStore,
    pub users: UserStore,
    pub events: EventStore,
    pub gallery: GalleryStore,
    pub notifications: NotificationStore,
    pub team_members: TeamMemberStore,
    pub milestones: MilestoneStore,
    pub settings: SettingsStore,
    exports: Arc<dyn FileSink>,
}

impl Dashboard {
    pub fn new(
        auth: Arc<AuthGate>,
        backends: Backends,
        settings: Arc<dyn SettingsRepository>,
        exports: Arc<dyn FileSink>,
    ) -> Self {
        Self {
            auth,
            locations: ResourceStore::new(backends.locations),
            contacts: ResourceStore::new(backends.contacts),
            feedback: ResourceStore::new(backends.feedback),
            inquiries: ResourceStore::new(backends.inquiries),
            users: ResourceStore::new(backends.users),
            events: ResourceStore::new(backends.events),
            gallery: GalleryStore::new(backends.gallery),
            notifications: ResourceStore::new(backends.notifications),
            team_members: ResourceStore::new(backends.team_members),
            milestones: ResourceStore::new(backends.milestones),
            settings: SettingsStore::new(settings),
            exports,
        }
    }

    pub fn exports(&self) -> &dyn FileSink {
        self.exports.as_ref()
    }

    /// Writes the loaded collection of `R` through the export sink.
    pub async fn export<R: Resource>(
        &self,
        store: &ResourceStore<R>,
        format: ExportFormat,
    ) -> Result<std::path::PathBuf, DomainError> {
        store.export(format, self.exports.as_ref()).await
    }

    /// Loads every collection and computes the landing-page numbers.
    ///
    /// The first failing collection aborts the refresh; collections that had
    /// already loaded keep their new contents.
    pub async fn refresh(&self) -> Result<Summary, DomainError> {
        let all = Filter::new();
        tokio::try_join!(
            self.locations.fetch_all(&all),
            self.contacts.fetch_all(&all),
            self.feedback.fetch_all(&all),
            self.inquiries.fetch_all(&all),
            self.users.fetch_all(&all),
            self.events.fetch_all(&all),
            self.gallery.images().fetch_all(&all),
            self.notifications.fetch_all(&all),
            self.team_members.fetch_all(&all),
            self.milestones.fetch_all(&all),
        )?;

        let summary = self.summary();
        info!(
            locations = summary.locations,
            contacts = summary.contacts,
            unread = summary.unread_notifications,
            "Dashboard refreshed"
        );
        Ok(summary)
    }

    /// Numbers for whatever is currently loaded. No requests are made.
    pub fn summary(&self) -> Summary {
        Summary {
            locations: self.locations.len(),
            active_locations: self.locations.active().len(),
            contacts: self.contacts.len(),
            pending_contacts: self.contacts.pending().len(),
            feedback: self.feedback.len(),
            average_rating: self.feedback.average_rating(),
            inquiries: self.inquiries.len(),
            new_inquiries: self.inquiries.by_status(InquiryStatus::New).len(),
            users: self.users.len(),
            events: self.events.len(),
            upcoming_events: self.events.upcoming().len(),
            images: self.gallery.images().len(),
            unread_notifications: self.notifications.counts().unread,
            team_members: self.team_members.len(),
            milestones: self.milestones.len(),
        }
    }
}
