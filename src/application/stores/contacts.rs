use crate::application::ResourceStore;
use crate::domain::{Contact, ContactChanges, ContactStatus, DomainError, Priority};

impl ResourceStore<Contact> {
    pub fn pending(&self) -> Vec<Contact> {
        self.select(|c| c.status == ContactStatus::Pending)
    }

    pub fn completed(&self) -> Vec<Contact> {
        self.select(|c| c.status == ContactStatus::Completed)
    }

    pub fn high_priority(&self) -> Vec<Contact> {
        self.select(|c| c.priority == Priority::High)
    }

    pub async fn set_status(&self, id: &str, status: ContactStatus) -> Result<Contact, DomainError> {
        self.update(id, ContactChanges::status(status)).await
    }

    /// Attaches a reply; the timeline records it as `responded`.
    pub async fn respond(
        &self,
        id: &str,
        text: &str,
        respondent_name: &str,
    ) -> Result<Contact, DomainError> {
        self.update(id, ContactChanges::respond(text, respondent_name))
            .await
    }
}
