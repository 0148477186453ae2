use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::entities::dao::{ProjectRecord, ProjectStatus};
use crate::schemas::{double_option, normalize_tags, trimmed, trimmed_opt};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "description is limited to 5000 characters"))]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[validate(url(message = "githubUrl must be a valid URL"))]
    pub github_url: Option<String>,
    #[validate(url(message = "liveUrl must be a valid URL"))]
    pub live_url: Option<String>,
    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub status: Option<ProjectStatus>,
}

impl CreateProjectRequest {
    pub fn into_record(self, now: DateTime<Utc>) -> ProjectRecord {
        ProjectRecord {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            technologies: normalize_tags(self.technologies),
            github_url: self.github_url,
            live_url: self.live_url,
            image_url: self.image_url,
            featured: self.featured,
            status: self.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_links(req: &UpdateProjectRequest) -> Result<(), ValidationError> {
    for link in [&req.github_url, &req.live_url, &req.image_url] {
        if let Some(Some(url)) = link {
            if !url.validate_url() {
                return Err(ValidationError::new("url").with_message("links must be valid URLs".into()));
            }
        }
    }
    Ok(())
}

/// Partial update; `null` clears a link.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_links"))]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "description is limited to 5000 characters"))]
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub live_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
}

impl UpdateProjectRequest {
    pub fn apply_to(self, project: &mut ProjectRecord, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(technologies) = self.technologies {
            project.technologies = normalize_tags(technologies);
        }
        if let Some(url) = self.github_url {
            project.github_url = url;
        }
        if let Some(url) = self.live_url {
            project.live_url = url;
        }
        if let Some(url) = self.image_url {
            project.image_url = url;
        }
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        project.updated_at = now;
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Only featured (`true`) or only non-featured (`false`) projects.
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(p: ProjectRecord) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            technologies: p.technologies,
            github_url: p.github_url,
            live_url: p.live_url,
            image_url: p.image_url,
            featured: p.featured,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
