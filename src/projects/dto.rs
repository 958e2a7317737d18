use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::projects::repo::{Project, ProjectWithUsers};
use crate::users::dto::UserBrief;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

/// Full update: absent optional fields clear the stored value.
#[derive(Debug, Deserialize)]
pub struct EditProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub author_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i64,
    pub author_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub author: Option<UserBrief>,
    pub manager: Option<UserBrief>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProjectWithUsers> for ProjectResponse {
    fn from(p: ProjectWithUsers) -> Self {
        let author = match (p.author_id, p.author_username) {
            (Some(id), Some(username)) => Some(UserBrief {
                id,
                username,
                first_name: p.author_first_name,
                last_name: p.author_last_name,
            }),
            _ => None,
        };
        let manager = match (p.manager_id, p.manager_username) {
            (Some(id), Some(username)) => Some(UserBrief {
                id,
                username,
                first_name: p.manager_first_name,
                last_name: p.manager_last_name,
            }),
            _ => None,
        };
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            workspace_id: p.workspace_id,
            author_id: p.author_id,
            manager_id: p.manager_id,
            author,
            manager,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            workspace_id: p.workspace_id,
            author_id: p.author_id,
            manager_id: p.manager_id,
            author: None,
            manager: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
