use tracing::info;

use crate::application::{ResourceStore, StoreEvent};
use crate::domain::{Attendee, DomainError, Event, EventAction, EventStatus, Resource};

impl ResourceStore<Event> {
    pub fn upcoming(&self) -> Vec<Event> {
        self.select(|e| e.status == EventStatus::Upcoming)
    }

    pub fn ongoing(&self) -> Vec<Event> {
        self.select(|e| e.status == EventStatus::Ongoing)
    }

    /// Registers an attendee.
    ///
    /// A loaded event that is already full is rejected before any request is
    /// sent. Returns the event as it stands afterwards, when it is known.
    pub async fn register_attendee(
        &self,
        id: &str,
        attendee: Attendee,
    ) -> Result<Option<Event>, DomainError> {
        self.track("register attendee for", async {
            if let Some(event) = self.find(id) {
                if event.is_full() {
                    return Err(DomainError::EventFull {
                        id: id.to_string(),
                        max: event.max_attendees,
                    });
                }
            }

            let action = EventAction::Register {
                id: id.to_string(),
                attendee,
            };
            match self.backend().perform(&action).await? {
                Some(wire) => {
                    self.replace_local(Event::from_wire(wire));
                }
                None => {
                    self.modify_local(id, |e| e.current_attendees += 1);
                }
            }

            info!(resource = Event::NAME, %id, "Attendee registered");
            self.emit(StoreEvent::Updated { id: id.to_string() });
            Ok(self.find(id))
        })
        .await
    }
}
