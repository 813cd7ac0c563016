//! Core data types flowing through the ingestion pipeline and out to the
//! dashboard. Field names serialize in camelCase to match the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of topic categories a story can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    World,
    Politics,
    Disaster,
    Conflict,
    Tech,
    Environment,
    Health,
    Finance,
    Entertainment,
    Sports,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::World => "world",
            Category::Politics => "politics",
            Category::Disaster => "disaster",
            Category::Conflict => "conflict",
            Category::Tech => "tech",
            Category::Environment => "environment",
            Category::Health => "health",
            Category::Finance => "finance",
            Category::Entertainment => "entertainment",
            Category::Sports => "sports",
        }
    }

    /// Case-insensitive parse; used when applying AI corrections.
    pub fn parse(s: &str) -> Option<Category> {
        match s.trim().to_ascii_lowercase().as_str() {
            "world" => Some(Category::World),
            "politics" => Some(Category::Politics),
            "disaster" => Some(Category::Disaster),
            "conflict" => Some(Category::Conflict),
            "tech" => Some(Category::Tech),
            "environment" => Some(Category::Environment),
            "health" => Some(Category::Health),
            "finance" => Some(Category::Finance),
            "entertainment" => Some(Category::Entertainment),
            "sports" => Some(Category::Sports),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(s: &str) -> Option<Sentiment> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

/// Canonical unit produced by the feed adapter and consumed by ranking,
/// tension scoring, and the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEvent {
    /// Adapter-namespaced id, unique per ingestion pass (`gdelt-…`, `local-…`,
    /// `major-…`, `sim-…`).
    pub id: String,
    pub title: String,
    pub summary: String,
    pub lat: f64,
    pub lng: f64,
    pub location_name: String,
    pub category: Category,
    pub sentiment: Sentiment,
    pub importance: Importance,
    /// Ingestion instant. The feed does not carry per-item publish times.
    pub timestamp: DateTime<Utc>,
    /// Canonical link, or `"#"` when unresolved.
    pub source_url: String,
    /// Resolved image, or the per-category placeholder.
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    Low,
    Medium,
    High,
    Critical,
}

/// Daily headline-risk verdict shown on the gauge widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionReading {
    /// 0–100.
    pub score: u8,
    pub rationale: String,
    pub volatility: Volatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketOutlook {
    Bullish,
    Bearish,
    Volatile,
    Stable,
}

impl MarketOutlook {
    pub fn parse(s: &str) -> Option<MarketOutlook> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullish" => Some(MarketOutlook::Bullish),
            "bearish" => Some(MarketOutlook::Bearish),
            "volatile" => Some(MarketOutlook::Volatile),
            "stable" => Some(MarketOutlook::Stable),
            _ => None,
        }
    }
}

/// Deterministic conflict-proximity read over one ranked event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheaterStatus {
    /// 0–99.
    pub proximity_score: u8,
    /// Named flashpoint labels, deduplicated, in detection order.
    pub active_theaters: Vec<String>,
    /// 5 = peace, 1 = nuclear exchange.
    pub defcon: u8,
    pub primary_threat: String,
    /// At most the first three escalation snippets recorded.
    pub recent_escalations: Vec<String>,
    pub nuclear_threat: bool,
}

/// Aggregate sentiment read for the dashboard header. The narrative fields may
/// come from the AI layer; the `ww3_*`/theater fields are always deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSentimentMetrics {
    pub global_tension_index: u8,
    pub defcon_level: u8,
    pub market_outlook: MarketOutlook,
    pub summary_report: String,
    pub trending_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic_insight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ww3_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_theaters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_threat: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// One ticker row (BTC/ETH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// 24h change in percent.
    pub change: f64,
    pub trend: Trend,
    pub last_updated: DateTime<Utc>,
}
