//! Last-resort sentiment heuristic: a keyword scan used only when the category
//! itself does not already imply a tone.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Category, Sentiment};

static RE_NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("kill|dead|death|crisis|down|fall|drop|warn|threat|fear|danger|attack|destroy|injure|fail|bankruptcy|scandal|arrest|prison|collapse")
        .expect("negative regex")
});
static RE_POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("win|record|gain|up|success|breakthrough|recover|safe|peace|agreement|growth|profit|honor|award|save|rescue|innovat|boost|rally|victory")
        .expect("positive regex")
});

/// Keyword scan, negative-then-positive; first match wins.
pub fn scan(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    if RE_NEGATIVE.is_match(&lower) {
        Sentiment::Negative
    } else if RE_POSITIVE.is_match(&lower) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// Category-implied tone, applied before the keyword scan when the category is
/// already known. `None` means the category carries no tone of its own.
pub fn implied_by_category(category: Category) -> Option<Sentiment> {
    match category {
        Category::Conflict | Category::Disaster => Some(Sentiment::Negative),
        Category::Health | Category::Tech | Category::Environment => Some(Sentiment::Positive),
        _ => None,
    }
}

/// Sentiment assignment for a freshly classified story.
pub fn assign(category: Category, text: &str) -> Sentiment {
    implied_by_category(category).unwrap_or_else(|| scan(text))
}
