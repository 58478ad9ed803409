use crate::application::ResourceStore;
use crate::domain::{DomainError, Inquiry, InquiryChanges, InquiryStatus};

impl ResourceStore<Inquiry> {
    pub fn by_status(&self, status: InquiryStatus) -> Vec<Inquiry> {
        self.select(|i| i.status == status)
    }

    /// Number of loaded inquiries per status, in workflow order.
    pub fn status_counts(&self) -> Vec<(InquiryStatus, usize)> {
        self.with_items(|items| {
            InquiryStatus::ALL
                .into_iter()
                .map(|s| (s, items.iter().filter(|i| i.status == s).count()))
                .collect()
        })
    }

    /// One backend update per id; stops at the first failure.
    pub async fn bulk_update_status(
        &self,
        ids: &[String],
        status: InquiryStatus,
    ) -> Result<Vec<Inquiry>, DomainError> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let changes = InquiryChanges {
                status: Some(status),
                ..Default::default()
            };
            updated.push(self.update(id, changes).await?);
        }
        Ok(updated)
    }
}
