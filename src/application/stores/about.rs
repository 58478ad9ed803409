use crate::application::ResourceStore;
use crate::domain::{parse_timestamp, MemberStatus, Milestone, TeamMember};

impl ResourceStore<TeamMember> {
    pub fn active(&self) -> Vec<TeamMember> {
        self.select(|m| m.status == MemberStatus::Active)
    }
}

impl ResourceStore<Milestone> {
    /// Newest first.
    pub fn sorted(&self) -> Vec<Milestone> {
        let mut milestones = self.items();
        milestones.sort_by(|a, b| parse_timestamp(&b.date).cmp(&parse_timestamp(&a.date)));
        milestones
    }
}
