use std::future::Future;

use crate::entities::dao::ProjectRecord;
use crate::entities::{parse_json, parse_label, parse_ts, to_json, ts, SqliteStore};

pub trait ProjectStore: Send + Sync + 'static {
    fn insert_project(
        &self,
        project: &ProjectRecord,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_project(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ProjectRecord>, sqlx::Error>> + Send;
    /// Newest first, optionally narrowed to featured (or non-featured) projects.
    fn list_projects(
        &self,
        featured: Option<bool>,
    ) -> impl Future<Output = Result<Vec<ProjectRecord>, sqlx::Error>> + Send;
    fn save_project(
        &self,
        project: &ProjectRecord,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn delete_project(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    title: String,
    description: String,
    technologies: String,
    github_url: Option<String>,
    live_url: Option<String>,
    image_url: Option<String>,
    featured: bool,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<ProjectRow> for ProjectRecord {
    fn from(row: ProjectRow) -> Self {
        ProjectRecord {
            technologies: parse_json(&row.technologies, "technologies"),
            status: parse_label(&row.status, "status"),
            created_at: parse_ts(&row.created_at, "created_at"),
            updated_at: parse_ts(&row.updated_at, "updated_at"),
            id: row.id,
            title: row.title,
            description: row.description,
            github_url: row.github_url,
            live_url: row.live_url,
            image_url: row.image_url,
            featured: row.featured,
        }
    }
}

const SELECT_PROJECT: &str = "SELECT id, title, description, technologies, github_url, live_url, \
     image_url, featured, status, created_at, updated_at FROM projects";

impl ProjectStore for SqliteStore {
    async fn insert_project(&self, project: &ProjectRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO projects (id, title, description, technologies, github_url, live_url, \
             image_url, featured, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(to_json(&project.technologies)?)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.image_url)
        .bind(project.featured)
        .bind(project.status.as_ref())
        .bind(ts(&project.created_at))
        .bind(ts(&project.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, sqlx::Error> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!("{SELECT_PROJECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_projects(&self, featured: Option<bool>) -> Result<Vec<ProjectRecord>, sqlx::Error> {
        let rows: Vec<ProjectRow> = match featured {
            Some(featured) => {
                sqlx::query_as(&format!(
                    "{SELECT_PROJECT} WHERE featured = ?1 ORDER BY created_at DESC, id ASC"
                ))
                .bind(featured)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("{SELECT_PROJECT} ORDER BY created_at DESC, id ASC"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save_project(&self, project: &ProjectRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE projects SET title = ?1, description = ?2, technologies = ?3, \
             github_url = ?4, live_url = ?5, image_url = ?6, featured = ?7, status = ?8, \
             updated_at = ?9 WHERE id = ?10",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(to_json(&project.technologies)?)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.image_url)
        .bind(project.featured)
        .bind(project.status.as_ref())
        .bind(ts(&project.updated_at))
        .bind(&project.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
