use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i64,
    pub author_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Project row enriched with author and manager user records.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectWithUsers {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i64,
    pub author_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_username: Option<String>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub manager_username: Option<String>,
    pub manager_first_name: Option<String>,
    pub manager_last_name: Option<String>,
}

const ENRICHED_COLUMNS: &str = "p.id, p.name, p.description, p.workspace_id, p.author_id, \
     p.manager_id, p.created_at, p.updated_at, \
     a.username AS author_username, a.first_name AS author_first_name, \
     a.last_name AS author_last_name, \
     m.username AS manager_username, m.first_name AS manager_first_name, \
     m.last_name AS manager_last_name";

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<ProjectWithUsers, AppError> {
    sqlx::query_as::<_, ProjectWithUsers>(&format!(
        "SELECT {ENRICHED_COLUMNS} FROM projects p \
         LEFT JOIN users a ON a.id = p.author_id \
         LEFT JOIN users m ON m.id = p.manager_id \
         WHERE p.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::ProjectNotFound)
}

pub async fn list_by_workspace(
    db: &PgPool,
    workspace_id: i64,
) -> Result<Vec<ProjectWithUsers>, AppError> {
    let projects = sqlx::query_as::<_, ProjectWithUsers>(&format!(
        "SELECT {ENRICHED_COLUMNS} FROM projects p \
         LEFT JOIN users a ON a.id = p.author_id \
         LEFT JOIN users m ON m.id = p.manager_id \
         WHERE p.workspace_id = $1 ORDER BY p.id DESC"
    ))
    .bind(workspace_id)
    .fetch_all(db)
    .await?;
    Ok(projects)
}

pub async fn exists(db: &PgPool, id: i64, workspace_id: i64) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND workspace_id = $2)",
    )
    .bind(id)
    .bind(workspace_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn create(
    db: &PgPool,
    workspace_id: i64,
    name: &str,
    author_id: Uuid,
) -> Result<Project, AppError> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (name, workspace_id, author_id) VALUES ($1, $2, $3) \
         RETURNING id, name, description, workspace_id, author_id, manager_id, \
         created_at, updated_at",
    )
    .bind(name)
    .bind(workspace_id)
    .bind(author_id)
    .fetch_one(db)
    .await?;
    Ok(project)
}

pub struct ProjectUpdate {
    pub name: String,
    pub description: Option<String>,
    pub author_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}

pub async fn update(db: &PgPool, id: i64, up: ProjectUpdate) -> Result<Project, AppError> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET name = $2, description = $3, author_id = $4, manager_id = $5, \
         updated_at = now() WHERE id = $1 \
         RETURNING id, name, description, workspace_id, author_id, manager_id, \
         created_at, updated_at",
    )
    .bind(id)
    .bind(&up.name)
    .bind(&up.description)
    .bind(up.author_id)
    .bind(up.manager_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::ProjectNotFound)
}

pub async fn remove(db: &PgPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
