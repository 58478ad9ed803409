use crate::application::ResourceStore;
use crate::domain::{DomainError, Location, LocationChanges};

impl ResourceStore<Location> {
    pub fn active(&self) -> Vec<Location> {
        self.select(|l| l.is_active)
    }

    pub fn by_state(&self, state: &str) -> Vec<Location> {
        self.select(|l| l.state.eq_ignore_ascii_case(state))
    }

    /// Sets the active flag on every id, one backend update each.
    /// Stops at the first failure; earlier updates stay applied.
    pub async fn bulk_update_status(
        &self,
        ids: &[String],
        is_active: bool,
    ) -> Result<Vec<Location>, DomainError> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let changes = LocationChanges {
                is_active: Some(is_active),
                ..Default::default()
            };
            updated.push(self.update(id, changes).await?);
        }
        Ok(updated)
    }
}
