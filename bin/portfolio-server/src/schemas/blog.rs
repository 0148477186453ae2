use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::dao::BlogPostRecord;
use crate::schemas::{normalize_tags, trimmed, trimmed_opt};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "excerpt is limited to 500 characters"))]
    pub excerpt: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl CreateBlogPostRequest {
    /// The slug is left for the caller to make unique.
    pub fn into_record(self, author_id: &str, slug: String, now: DateTime<Utc>) -> BlogPostRecord {
        let mut post = BlogPostRecord {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            slug,
            excerpt: self.excerpt,
            content: self.content,
            tags: normalize_tags(self.tags),
            published: false,
            published_at: None,
            author_id: author_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        post.set_published(self.published, now);
        post
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "excerpt is limited to 500 characters"))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl UpdateBlogPostRequest {
    /// Merge into `post`. A new title does not re-slug; the handler does that.
    pub fn apply_to(self, post: &mut BlogPostRecord, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(tags) = self.tags {
            post.tags = normalize_tags(tags);
        }
        if let Some(published) = self.published {
            post.set_published(published, now);
        }
        post.updated_at = now;
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogListQuery {
    /// Only posts carrying this tag.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogPostRecord> for BlogPostResponse {
    fn from(p: BlogPostRecord) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            content: p.content,
            tags: p.tags,
            published: p.published,
            published_at: p.published_at,
            author: p.author_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
