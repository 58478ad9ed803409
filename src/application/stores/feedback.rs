use crate::application::ResourceStore;
use crate::domain::{DomainError, Feedback, FeedbackAction, FeedbackStatus};

impl ResourceStore<Feedback> {
    pub fn published(&self) -> Vec<Feedback> {
        self.select(|f| f.status == FeedbackStatus::Published)
    }

    pub fn pending(&self) -> Vec<Feedback> {
        self.select(|f| f.status == FeedbackStatus::Pending)
    }

    /// Mean rating over the loaded feedback; `0.0` when there is none.
    pub fn average_rating(&self) -> f64 {
        self.with_items(|items| {
            if items.is_empty() {
                return 0.0;
            }
            let sum: u32 = items.iter().map(|f| f.rating as u32).sum();
            sum as f64 / items.len() as f64
        })
    }

    pub async fn mark_helpful(&self, id: &str, is_helpful: bool) -> Result<Option<Feedback>, DomainError> {
        let action = FeedbackAction::Helpful {
            id: id.to_string(),
            is_helpful,
        };
        let returned = self.perform("mark helpful", action).await?;
        Ok(returned.or_else(|| self.find(id)))
    }
}
