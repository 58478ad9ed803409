//! Entity-specific operations and derived views layered on [`ResourceStore`].

mod about;
mod contacts;
mod events;
mod feedback;
mod gallery;
mod inquiries;
mod locations;
mod notifications;
mod users;

pub use gallery::GalleryStore;

use crate::application::ResourceStore;
use crate::domain::{
    Contact, Event, Feedback, Inquiry, Location, Milestone, Notification, TeamMember, User,
};

pub type LocationStore = ResourceStore<Location>;
pub type ContactStore = ResourceStore<Contact>;
pub type FeedbackStore = ResourceStore<Feedback>;
pub type InquiryStore = ResourceStore<Inquiry>;
pub type UserStore = ResourceStore<User>;
pub type EventStore = ResourceStore<Event>;
pub type NotificationStore = ResourceStore<Notification>;
pub type TeamMemberStore = ResourceStore<TeamMember>;
pub type MilestoneStore = ResourceStore<Milestone>;
