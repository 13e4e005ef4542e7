//! Role gating for UI affordances. The server remains the enforcement point.

use crate::core::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProject,
    EditProject,
    DeleteProject,
    AssignProject,
    UpdateStatus,
    ViewProjects,
}

pub fn allows(role: Option<Role>, action: Action) -> bool {
    match (role, action) {
        (None, _) => false,
        (Some(Role::Trainer), _) => true,
        (Some(Role::Trainee), Action::UpdateStatus | Action::ViewProjects) => true,
        (Some(Role::Trainee), _) => false,
    }
}
