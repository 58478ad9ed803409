use crate::application::ResourceStore;
use crate::domain::User;

impl ResourceStore<User> {
    pub fn active(&self) -> Vec<User> {
        self.select(User::is_active)
    }

    pub fn by_role(&self, role: &str) -> Vec<User> {
        self.select(|u| u.role.eq_ignore_ascii_case(role))
    }
}
