use super::player::Role;
use super::roster::Roster;
use serde::{Deserialize, Serialize};

/// The roles still to be called tonight.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NightQueue {
    roles: Vec<Role>,
    cursor: usize,
}

impl NightQueue {
    /// Builds tonight's queue from the roles that have at least one living holder.
    /// An empty queue is valid and means the night passes without any actions.
    pub fn build(roster: &Roster) -> Self {
        let roles = Role::NIGHT_ORDER
            .into_iter()
            .filter(|role| roster.has_living(*role))
            .collect();
        Self { roles, cursor: 0 }
    }

    /// The role currently being called, or `None` once everyone has acted.
    pub fn current(&self) -> Option<Role> {
        self.roles.get(self.cursor).copied()
    }

    /// Moves on to the next role and returns it.
    pub fn advance(&mut self) -> Option<Role> {
        if self.cursor < self.roles.len() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn is_done(&self) -> bool {
        self.current().is_none()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
