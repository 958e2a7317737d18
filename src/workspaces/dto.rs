use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::users::dto::UserBrief;
use crate::workspaces::repo::{MemberWithUser, WorkspaceRole};

#[derive(Debug, Deserialize)]
pub struct WorkspaceRequest {
    pub name: String,
}

impl WorkspaceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() || self.name.len() > 50 {
            return Err(AppError::Validation(vec![
                "workspace name must be 1-50 characters".into(),
            ]));
        }
        Ok(())
    }
}

/// Roles a member can be given through the API. OWNER is assigned only at
/// workspace creation and never via member add/edit.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Admin,
    Editor,
    Viewer,
}

impl From<AssignableRole> for WorkspaceRole {
    fn from(role: AssignableRole) -> Self {
        match role {
            AssignableRole::Admin => WorkspaceRole::Admin,
            AssignableRole::Editor => WorkspaceRole::Editor,
            AssignableRole::Viewer => WorkspaceRole::Viewer,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: AssignableRole,
}

#[derive(Debug, Deserialize)]
pub struct EditMemberRequest {
    pub user_id: Uuid,
    pub role: AssignableRole,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user: UserBrief,
    pub workspace_id: i64,
    pub role: WorkspaceRole,
    pub active: bool,
}

impl From<MemberWithUser> for MemberResponse {
    fn from(m: MemberWithUser) -> Self {
        Self {
            user: UserBrief {
                id: m.user_id,
                username: m.username,
                first_name: m.first_name,
                last_name: m.last_name,
            },
            workspace_id: m.workspace_id,
            role: m.role,
            active: m.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_not_assignable() {
        // the restricted enum is the guard: "owner" must not deserialize
        assert!(serde_json::from_str::<AssignableRole>("\"owner\"").is_err());
        assert!(serde_json::from_str::<AssignableRole>("\"admin\"").is_ok());
    }

    #[test]
    fn workspace_name_bounds() {
        assert!(WorkspaceRequest { name: "".into() }.validate().is_err());
        assert!(WorkspaceRequest { name: "a".repeat(51) }.validate().is_err());
        assert!(WorkspaceRequest { name: "ops".into() }.validate().is_ok());
    }
}
