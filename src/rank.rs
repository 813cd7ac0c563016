//! Deduplication & ranking: merges events from multiple adapter calls,
//! collapses near-duplicate stories, scores by a heat function, and returns a
//! stable, bounded ordering.
//!
//! Everything here is pure given an explicit `now` — no hidden randomness —
//! so ranking stays testable and idempotent.

use chrono::{DateTime, Utc};

use crate::model::{Importance, NewsEvent};

/// Geopolitical escalation vocabulary; each hit in a title adds +20 heat.
pub const CONFLICT_KEYWORDS: &[&str] = &[
    "war",
    "nuclear",
    "missile",
    "strike",
    "invasion",
    "military",
    "army",
    "weapon",
    "sanctions",
    "treaty",
    "escalation",
    "crisis",
    "nato",
    "russia",
    "china",
    "iran",
    "israel",
    "gaza",
    "ukraine",
    "venezuela",
    "guyana",
    "essequibo",
    "yemen",
    "red sea",
    "houthi",
    "taiwan",
    "strait",
    "korea",
    "lebanon",
    "hezbollah",
    "pentagon",
    "white house",
    "drill",
    "offensive",
    "deploy",
];

/// Hosts whose coverage earns the credibility boost.
const MAJOR_HOSTS: &[&str] = &["cnn", "bbc", "reuters", "apnews", "aljazeera"];

/// Titles shorter than this are junk (truncated fragments, place names).
const MIN_TITLE_LEN: usize = 20;

/// Crude similarity key: lowercased first 15 characters of the title.
/// Near-duplicates with different leading words will NOT merge — accepted
/// behavior, kept for compatibility with the dashboard's history.
fn dedup_key(title: &str) -> String {
    title.chars().take(15).collect::<String>().to_lowercase()
}

fn is_junk(ev: &NewsEvent) -> bool {
    let lower = ev.title.to_lowercase();
    ev.title.len() < MIN_TITLE_LEN
        || lower.starts_with("video:")
        || lower.contains("weather forecast")
}

/// Filter junk and collapse near-duplicates, preserving input order.
/// First-seen wins, unless a later duplicate is high-importance and the stored
/// one is not — then the later record replaces it in place. Importance is the
/// only tiebreaker; recency is deliberately ignored.
pub fn dedup_events(events: Vec<NewsEvent>) -> Vec<NewsEvent> {
    let mut out: Vec<NewsEvent> = Vec::with_capacity(events.len());
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for ev in events {
        if is_junk(&ev) {
            continue;
        }
        let key = dedup_key(&ev.title);
        match index.get(&key) {
            None => {
                index.insert(key, out.len());
                out.push(ev);
            }
            Some(&pos) => {
                if ev.importance == Importance::High && out[pos].importance != Importance::High {
                    out[pos] = ev;
                }
            }
        }
    }
    out
}

/// Importance/heat function: keyword hits (title only), recency buckets, and
/// a credibility boost for recognized major-outlet hosts.
pub fn heat_score(ev: &NewsEvent, now: DateTime<Utc>) -> i64 {
    let mut score = 0i64;

    let title = ev.title.to_lowercase();
    for word in CONFLICT_KEYWORDS {
        if title.contains(word) {
            score += 20;
        }
    }

    let hours_ago = (now - ev.timestamp).num_seconds() as f64 / 3600.0;
    if hours_ago < 4.0 {
        score += 15;
    } else if hours_ago < 12.0 {
        score += 5;
    }

    let url = ev.source_url.to_lowercase();
    if MAJOR_HOSTS.iter().any(|h| url.contains(h)) {
        score += 25;
    }

    score
}

/// Merge → dedup → score → stable descending sort → truncate.
/// Running this on its own output yields the identical list.
pub fn rank_events(events: Vec<NewsEvent>, now: DateTime<Utc>, limit: Option<usize>) -> Vec<NewsEvent> {
    let deduped = dedup_events(events);

    let mut scored: Vec<(i64, NewsEvent)> = deduped
        .into_iter()
        .map(|ev| (heat_score(&ev, now), ev))
        .collect();
    // stable: ties keep input order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out: Vec<NewsEvent> = scored.into_iter().map(|(_, ev)| ev).collect();
    if let Some(limit) = limit {
        out.truncate(limit);
    }
    out
}

/// Local-breaking ordering: recency alone ranks, unbounded.
pub fn rank_local(events: Vec<NewsEvent>, now: DateTime<Utc>) -> Vec<NewsEvent> {
    let mut scored: Vec<(f64, NewsEvent)> = events
        .into_iter()
        .map(|ev| {
            let hours_ago = (now - ev.timestamp).num_seconds() as f64 / 3600.0;
            (24.0 - hours_ago, ev)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, ev)| ev).collect()
}
