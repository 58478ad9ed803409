use crate::application::ResourceStore;
use crate::domain::{DomainError, Notification, NotificationAction, NotificationCounts};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl ResourceStore<Notification> {
    pub fn unread(&self) -> Vec<Notification> {
        self.select(|n| !n.is_read)
    }

    pub fn counts(&self) -> NotificationCounts {
        self.with_items(NotificationCounts::of)
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<(), DomainError> {
        let returned = self
            .perform("mark as read", NotificationAction::MarkAsRead(id.to_string()))
            .await?;
        if returned.is_none() {
            self.modify_local(id, |n| {
                if !n.is_read {
                    n.is_read = true;
                    n.read_at = Some(now());
                }
            });
        }
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> Result<(), DomainError> {
        self.perform("mark all as read", NotificationAction::MarkAllAsRead)
            .await?;
        let stamp = now();
        self.modify_all(|n| {
            if !n.is_read {
                n.is_read = true;
                n.read_at = Some(stamp.clone());
            }
        });
        Ok(())
    }
}
