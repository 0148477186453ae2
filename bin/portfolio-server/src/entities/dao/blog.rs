use chrono::{DateTime, Utc};

/// A row in the `blog_posts` table.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostRecord {
    pub id: String,
    pub title: String,
    /// URL-safe, unique handle derived from the title.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub published: bool,
    /// Set the first time the post is published; never cleared.
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPostRecord {
    pub fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        self.published = published;
        if published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("post");
    }
    slug
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hello, World!  "), "hello-world");
        assert_eq!(slugify("Rust & WebGL -- part 2"), "rust-webgl-part-2");
        assert_eq!(slugify("¿¡!"), "post");
    }

    #[test]
    fn published_at_latches_once() {
        let now = Utc::now();
        let mut post = BlogPostRecord {
            id: "b1".into(),
            title: "t".into(),
            slug: "t".into(),
            excerpt: String::new(),
            content: "c".into(),
            tags: vec![],
            published: false,
            published_at: None,
            author_id: "u1".into(),
            created_at: now,
            updated_at: now,
        };
        post.set_published(true, now);
        post.set_published(false, now + chrono::Duration::days(1));
        assert_eq!(post.published_at, Some(now));
        assert!(!post.published);
    }
}
