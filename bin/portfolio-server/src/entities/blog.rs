use std::future::Future;

use crate::entities::dao::BlogPostRecord;
use crate::entities::{parse_json, parse_opt_ts, parse_ts, to_json, ts, SqliteStore};

pub trait BlogStore: Send + Sync + 'static {
    fn insert_post(&self, post: &BlogPostRecord) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Look a post up by id first, then by slug.
    fn get_post(
        &self,
        id_or_slug: &str,
    ) -> impl Future<Output = Result<Option<BlogPostRecord>, sqlx::Error>> + Send;
    /// Whether `slug` is taken by a post other than `exclude_id`.
    fn slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    /// Newest first.
    fn list_posts(
        &self,
        published_only: bool,
        tag: Option<&str>,
    ) -> impl Future<Output = Result<Vec<BlogPostRecord>, sqlx::Error>> + Send;
    fn save_post(&self, post: &BlogPostRecord) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn delete_post(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: String,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    tags: String,
    published: bool,
    published_at: Option<String>,
    author_id: String,
    created_at: String,
    updated_at: String,
}

impl From<BlogPostRow> for BlogPostRecord {
    fn from(row: BlogPostRow) -> Self {
        BlogPostRecord {
            tags: parse_json(&row.tags, "tags"),
            published_at: parse_opt_ts(row.published_at, "published_at"),
            created_at: parse_ts(&row.created_at, "created_at"),
            updated_at: parse_ts(&row.updated_at, "updated_at"),
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            published: row.published,
            author_id: row.author_id,
        }
    }
}

const SELECT_POST: &str = "SELECT id, title, slug, excerpt, content, tags, published, published_at, \
     author_id, created_at, updated_at FROM blog_posts";

impl BlogStore for SqliteStore {
    async fn insert_post(&self, post: &BlogPostRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO blog_posts (id, title, slug, excerpt, content, tags, published, \
             published_at, author_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(to_json(&post.tags)?)
        .bind(post.published)
        .bind(post.published_at.as_ref().map(ts))
        .bind(&post.author_id)
        .bind(ts(&post.created_at))
        .bind(ts(&post.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_post(&self, id_or_slug: &str) -> Result<Option<BlogPostRecord>, sqlx::Error> {
        let row: Option<BlogPostRow> = sqlx::query_as(&format!(
            "{SELECT_POST} WHERE id = ?1 OR slug = ?1 ORDER BY (id = ?1) DESC LIMIT 1"
        ))
        .bind(id_or_slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool, sqlx::Error> {
        let (n,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM blog_posts WHERE slug = ?1 AND id IS NOT ?2")
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(n > 0)
    }

    async fn list_posts(
        &self,
        published_only: bool,
        tag: Option<&str>,
    ) -> Result<Vec<BlogPostRecord>, sqlx::Error> {
        let rows: Vec<BlogPostRow> = sqlx::query_as(&format!(
            "{SELECT_POST} WHERE (?1 = 0 OR published = 1) \
             AND (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(blog_posts.tags) \
             WHERE json_each.value = ?2)) \
             ORDER BY created_at DESC, id ASC"
        ))
        .bind(published_only)
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save_post(&self, post: &BlogPostRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE blog_posts SET title = ?1, slug = ?2, excerpt = ?3, content = ?4, tags = ?5, \
             published = ?6, published_at = ?7, updated_at = ?8 WHERE id = ?9",
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(to_json(&post.tags)?)
        .bind(post.published)
        .bind(post.published_at.as_ref().map(ts))
        .bind(ts(&post.updated_at))
        .bind(&post.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_post(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::entities::dao::{slugify, BlogPostRecord};

    pub fn post(id: &str, title: &str, published: bool) -> BlogPostRecord {
        let now = Utc::now();
        BlogPostRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            slug: slugify(title),
            excerpt: String::new(),
            content: "body".into(),
            tags: vec!["rust".into()],
            published,
            published_at: published.then_some(now),
            author_id: "admin".into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod test {
    use super::fixtures::post;
    use super::*;

    #[tokio::test]
    async fn lookup_by_id_or_slug() {
        let store = SqliteStore::in_memory().await;
        store.insert_post(&post("b1", "Hello World", true)).await.unwrap();
        assert_eq!(store.get_post("b1").await.unwrap().unwrap().slug, "hello-world");
        assert_eq!(store.get_post("hello-world").await.unwrap().unwrap().id, "b1");
        assert!(store.get_post("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn slug_uniqueness_excludes_self() {
        let store = SqliteStore::in_memory().await;
        store.insert_post(&post("b1", "Hello", false)).await.unwrap();
        assert!(store.slug_exists("hello", None).await.unwrap());
        assert!(!store.slug_exists("hello", Some("b1")).await.unwrap());
        assert!(!store.slug_exists("other", None).await.unwrap());
    }

    #[tokio::test]
    async fn list_hides_drafts_and_filters_by_tag() {
        let store = SqliteStore::in_memory().await;
        store.insert_post(&post("b1", "Live", true)).await.unwrap();
        store.insert_post(&post("b2", "Draft", false)).await.unwrap();
        let mut other = post("b3", "Other", true);
        other.tags = vec!["life".into()];
        store.insert_post(&other).await.unwrap();

        assert_eq!(store.list_posts(true, None).await.unwrap().len(), 2);
        assert_eq!(store.list_posts(false, None).await.unwrap().len(), 3);
        let tagged = store.list_posts(true, Some("rust")).await.unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id, "b1");
    }
}
