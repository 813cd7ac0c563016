//! AI batch enrichment: asks the model to correct category/sentiment for the
//! head of the ranked list. Corrections produce new record copies — shared
//! records are never mutated — and any failure returns the input unchanged.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::ai::{self, TextCompletion};
use crate::model::{Category, NewsEvent, Sentiment};

/// Only the head of the list is worth the tokens.
const ENRICH_LEN: usize = 15;

#[derive(Debug, Default, Deserialize)]
struct CorrectionSet {
    #[serde(default)]
    corrections: Vec<Correction>,
}

#[derive(Debug, Deserialize)]
struct Correction {
    id: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
}

fn enrich_prompt(digest: &str) -> String {
    format!(
        r#"You are an Intelligence Analyst. Correct the categories for these news items.
Rules:
1. "Army/Military" doing "Medical/Aid/Rescue" is category "health" or "world", NOT "conflict".
2. "conflict" is ONLY for active violence (fighting, missiles, attacks).
3. Return a JSON object mapping ID to new data.

News Layout:
{digest}

Output Format (JSON Only):
{{
  "corrections": [
    {{ "id": "...", "category": "...", "sentiment": "positive"|"negative"|"neutral" }}
  ]
}}"#
    )
}

/// Apply AI category/sentiment corrections to the top of the ranked list.
/// Unknown ids and unparseable labels are ignored; a disabled client or any
/// failure leaves the list untouched.
pub async fn enrich_events(events: Vec<NewsEvent>, ai: &dyn TextCompletion) -> Vec<NewsEvent> {
    if !ai.enabled() || events.is_empty() {
        return events;
    }

    let digest = events
        .iter()
        .take(ENRICH_LEN)
        .map(|ev| format!("ID:{}|TITLE:{}|CURR_CAT:{}", ev.id, ev.title, ev.category.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    let reply = match ai.complete(&enrich_prompt(&digest)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = ?e, "enrichment call failed; keeping original labels");
            return events;
        }
    };
    let Some(set) = ai::extract_json::<CorrectionSet>(&reply) else {
        warn!("enrichment reply was not parseable; keeping original labels");
        return events;
    };

    let by_id: HashMap<&str, &Correction> =
        set.corrections.iter().map(|c| (c.id.as_str(), c)).collect();

    events
        .into_iter()
        .map(|ev| match by_id.get(ev.id.as_str()) {
            Some(c) => {
                let mut fixed = ev;
                if let Some(cat) = c.category.as_deref().and_then(Category::parse) {
                    fixed.category = cat;
                }
                if let Some(s) = c.sentiment.as_deref().and_then(Sentiment::parse) {
                    fixed.sentiment = s;
                }
                fixed
            }
            None => ev,
        })
        .collect()
}
