//! Article vault: a URL-keyed store used to remember stories across sessions.
//! External collaborator behind a narrow trait — the pipeline must keep
//! working when the store is down, so every failure is logged and swallowed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Row shape in the vault's `articles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: String,
    pub source_url: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub source_name: String,
    /// Filled by a later AI pass; null until then.
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub ai_content: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload (the store assigns id/created_at).
#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub source_url: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub image_url: String,
    pub source_name: String,
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Lookup by canonical URL; `None` covers both "not found" and "store
    /// unavailable".
    async fn find_by_url(&self, url: &str) -> Option<StoredArticle>;
    /// Insert; `None` on any failure (duplicate, unavailable, …).
    async fn insert(&self, article: NewArticle) -> Option<StoredArticle>;
}

/// Archiving disabled (no vault configured).
pub struct NoopArticleStore;

#[async_trait]
impl ArticleStore for NoopArticleStore {
    async fn find_by_url(&self, _url: &str) -> Option<StoredArticle> {
        None
    }
    async fn insert(&self, _article: NewArticle) -> Option<StoredArticle> {
        None
    }
}

/// PostgREST-backed vault (Supabase-style REST endpoint).
pub struct RestArticleStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestArticleStore {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/articles", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ArticleStore for RestArticleStore {
    async fn find_by_url(&self, url: &str) -> Option<StoredArticle> {
        let resp = self
            .http
            .get(self.table_url())
            .query(&[
                ("select", "*"),
                ("source_url", &format!("eq.{url}")),
                ("limit", "1"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "vault lookup rejected");
                return None;
            }
            Err(e) => {
                warn!(error = ?e, "vault unreachable; continuing without archive");
                return None;
            }
        };

        match resp.json::<Vec<StoredArticle>>().await {
            Ok(mut rows) => rows.pop(),
            Err(e) => {
                warn!(error = ?e, "vault lookup body unparseable");
                None
            }
        }
    }

    async fn insert(&self, article: NewArticle) -> Option<StoredArticle> {
        let resp = self
            .http
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&vec![article])
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "vault insert rejected");
                return None;
            }
            Err(e) => {
                warn!(error = ?e, "vault unreachable; article not archived");
                return None;
            }
        };

        match resp.json::<Vec<StoredArticle>>().await {
            Ok(mut rows) => rows.pop(),
            Err(e) => {
                warn!(error = ?e, "vault insert body unparseable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_parses_without_optional_columns() {
        // Old rows predate the AI columns; they come back without them.
        let row = r#"{
            "id": "a1",
            "source_url": "https://news.test/story",
            "title": "Story title",
            "created_at": "2026-08-29T12:00:00Z"
        }"#;
        let article: StoredArticle = serde_json::from_str(row).expect("row parses");
        assert_eq!(article.id, "a1");
        assert!(article.ai_summary.is_none());
        assert!(article.ai_content.is_none());
        assert!(article.published_at.is_none());
        assert!(article.summary.is_empty());
    }

    #[test]
    fn row_parses_with_ai_columns() {
        let row = r#"{
            "id": "a2",
            "source_url": "https://news.test/other",
            "title": "Other title",
            "ai_summary": "Condensed.",
            "ai_content": "Full rewrite.",
            "published_at": "2026-08-29T08:30:00Z",
            "created_at": "2026-08-29T12:00:00Z"
        }"#;
        let article: StoredArticle = serde_json::from_str(row).expect("row parses");
        assert_eq!(article.ai_summary.as_deref(), Some("Condensed."));
        assert!(article.published_at.is_some());
    }
}
