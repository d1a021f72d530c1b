use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dump of the editable site content, as exported from the backend tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentExport {
    #[serde(default)]
    pub posts: Vec<BlogPost>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogPost {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: Option<String>,
    /// Rich text, untrusted.
    pub content: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published: bool,
    #[serde(default, with = "crate::rfc3339::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    /// Rich text, untrusted.
    pub description: String,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    /// Rich text, untrusted.
    pub answer: String,
    pub sort_order: i64,
}

impl BlogPost {
    pub fn slug(&self) -> String {
        slug_or_title(&self.slug, &self.title)
    }

    /// When the post went public, or when it was written if that was never recorded.
    pub fn date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

impl Project {
    pub fn slug(&self) -> String {
        slug_or_title(&self.slug, &self.title)
    }
}

fn slug_or_title(slug: &Option<String>, title: &str) -> String {
    match slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slug::slugify(title),
    }
}

impl ContentExport {
    /// Published posts, newest first.
    pub fn published_posts(&self) -> Vec<&BlogPost> {
        let mut posts: Vec<_> = self.posts.iter().filter(|post| post.published).collect();
        posts.sort_by_key(|post| Reverse(post.date()));
        posts
    }

    /// Featured projects first, then by their sort order.
    pub fn ordered_projects(&self) -> Vec<&Project> {
        let mut projects: Vec<_> = self.projects.iter().collect();
        projects.sort_by_key(|project| (!project.featured, project.sort_order));
        projects
    }

    pub fn ordered_faqs(&self) -> Vec<&FaqEntry> {
        let mut faqs: Vec<_> = self.faqs.iter().collect();
        faqs.sort_by_key(|faq| faq.sort_order);
        faqs
    }

    pub fn latest_update(&self) -> Option<DateTime<Utc>> {
        self.published_posts().iter().map(|post| post.date()).max()
    }
}
