use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tasks::repo::{Task, TaskPriority, TaskStatus, TaskWithRelations};
use crate::users::dto::UserBrief;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
}

fn default_status() -> TaskStatus {
    TaskStatus::Open
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Full update: absent nullable fields clear the stored value; absent
/// status/priority keep it.
#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    pub project_id: Option<i64>,
    pub author_id: Option<Uuid>,
    pub performer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProjectBrief {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub author_id: Option<Uuid>,
    pub performer_id: Option<Uuid>,
    pub author: Option<UserBrief>,
    pub performer: Option<UserBrief>,
    pub project: Option<ProjectBrief>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<TaskWithRelations> for TaskResponse {
    fn from(t: TaskWithRelations) -> Self {
        let author = match (t.author_id, t.author_username) {
            (Some(id), Some(username)) => Some(UserBrief {
                id,
                username,
                first_name: t.author_first_name,
                last_name: t.author_last_name,
            }),
            _ => None,
        };
        let performer = match (t.performer_id, t.performer_username) {
            (Some(id), Some(username)) => Some(UserBrief {
                id,
                username,
                first_name: t.performer_first_name,
                last_name: t.performer_last_name,
            }),
            _ => None,
        };
        let project = match (t.project_id, t.project_name) {
            (Some(id), Some(name)) => Some(ProjectBrief { id, name }),
            _ => None,
        };
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            status: t.status,
            priority: t.priority,
            deadline: t.deadline,
            workspace_id: t.workspace_id,
            project_id: t.project_id,
            author_id: t.author_id,
            performer_id: t.performer_id,
            author,
            performer,
            project,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            status: t.status,
            priority: t.priority,
            deadline: t.deadline,
            workspace_id: t.workspace_id,
            project_id: t.project_id,
            author_id: t.author_id,
            performer_id: t.performer_id,
            author: None,
            performer: None,
            project: None,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_open_medium() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"name": "fix build"}"#).unwrap();
        assert_eq!(req.status, TaskStatus::Open);
        assert_eq!(req.priority, TaskPriority::Medium);
    }

    #[test]
    fn create_accepts_explicit_status() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"name": "x", "status": "in_review", "priority": "high"}"#)
                .unwrap();
        assert_eq!(req.status, TaskStatus::InReview);
        assert_eq!(req.priority, TaskPriority::High);
    }

    #[test]
    fn edit_parses_rfc3339_deadline() {
        let req: EditTaskRequest = serde_json::from_str(
            r#"{"name": "x", "deadline": "2026-01-15T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(req.deadline.is_some());
        assert!(req.status.is_none());
    }
}
