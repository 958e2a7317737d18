use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    InReview,
    Done,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<OffsetDateTime>,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub author_id: Option<Uuid>,
    pub performer_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Task row enriched with author, performer and project.
#[derive(Debug, Clone, FromRow)]
pub struct TaskWithRelations {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<OffsetDateTime>,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub author_id: Option<Uuid>,
    pub performer_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_username: Option<String>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub performer_username: Option<String>,
    pub performer_first_name: Option<String>,
    pub performer_last_name: Option<String>,
    pub project_name: Option<String>,
}

const ENRICHED_COLUMNS: &str = "t.id, t.name, t.description, t.status, t.priority, t.deadline, \
     t.workspace_id, t.project_id, t.author_id, t.performer_id, t.created_at, t.updated_at, \
     a.username AS author_username, a.first_name AS author_first_name, \
     a.last_name AS author_last_name, \
     pf.username AS performer_username, pf.first_name AS performer_first_name, \
     pf.last_name AS performer_last_name, \
     pr.name AS project_name";

const ENRICHED_JOINS: &str = "LEFT JOIN users a ON a.id = t.author_id \
     LEFT JOIN users pf ON pf.id = t.performer_id \
     LEFT JOIN projects pr ON pr.id = t.project_id";

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<TaskWithRelations, AppError> {
    sqlx::query_as::<_, TaskWithRelations>(&format!(
        "SELECT {ENRICHED_COLUMNS} FROM tasks t {ENRICHED_JOINS} WHERE t.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::TaskNotFound)
}

pub async fn list_by_workspace(
    db: &PgPool,
    workspace_id: i64,
) -> Result<Vec<TaskWithRelations>, AppError> {
    let tasks = sqlx::query_as::<_, TaskWithRelations>(&format!(
        "SELECT {ENRICHED_COLUMNS} FROM tasks t {ENRICHED_JOINS} \
         WHERE t.workspace_id = $1 ORDER BY t.id DESC"
    ))
    .bind(workspace_id)
    .fetch_all(db)
    .await?;
    Ok(tasks)
}

pub async fn exists(db: &PgPool, id: i64, workspace_id: i64) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND workspace_id = $2)",
    )
    .bind(id)
    .bind(workspace_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub struct NewTask {
    pub name: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub workspace_id: i64,
    pub author_id: Uuid,
}

const TASK_COLUMNS: &str = "id, name, description, status, priority, deadline, workspace_id, \
     project_id, author_id, performer_id, created_at, updated_at";

pub async fn create(db: &PgPool, new: NewTask) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (name, status, priority, workspace_id, author_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
    ))
    .bind(&new.name)
    .bind(new.status)
    .bind(new.priority)
    .bind(new.workspace_id)
    .bind(new.author_id)
    .fetch_one(db)
    .await?;
    Ok(task)
}

pub struct TaskUpdate {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<OffsetDateTime>,
    pub project_id: Option<i64>,
    pub author_id: Option<Uuid>,
    pub performer_id: Option<Uuid>,
}

/// Full update; status/priority keep their stored value when absent, the
/// nullable references are overwritten (absent clears).
pub async fn update(db: &PgPool, id: i64, up: TaskUpdate) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET name = $2, description = $3, \
         status = COALESCE($4, status), priority = COALESCE($5, priority), \
         deadline = $6, project_id = $7, author_id = $8, performer_id = $9, \
         updated_at = now() WHERE id = $1 RETURNING {TASK_COLUMNS}"
    ))
    .bind(id)
    .bind(&up.name)
    .bind(&up.description)
    .bind(up.status)
    .bind(up.priority)
    .bind(up.deadline)
    .bind(up.project_id)
    .bind(up.author_id)
    .bind(up.performer_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::TaskNotFound)
}

pub async fn remove(db: &PgPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let s: TaskStatus = serde_json::from_str("\"in_review\"").unwrap();
        assert_eq!(s, TaskStatus::InReview);
    }

    #[test]
    fn priority_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskPriority::Critical).unwrap(),
            "\"critical\""
        );
    }
}
