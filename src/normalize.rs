//! Headline normalizer: recovers a clean title, canonical URL and image from
//! the loose HTML fragment GDELT attaches to each geo feature.
//!
//! The rest of the pipeline never touches raw markup; everything goes through
//! [`resolve_headline`], which has a well-defined failure mode (defaults stand,
//! fields stay unset).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Category;

/// Placeholder title when the feature carries no usable name.
pub const DEFAULT_TITLE: &str = "Global Event Detected";
/// Sentinel for an unresolved source link.
pub const UNRESOLVED_URL: &str = "#";

/// Minimum raw-candidate length for an extracted anchor text to replace the
/// feature name.
const MIN_CANDIDATE_LEN: usize = 5;

static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]+href=["']([^"']+)["'][^>]*>(.*?)</a>"#).expect("anchor regex")
});
static RE_IMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<img[^>]+src=["']([^"']+)["']"#).expect("img regex"));
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.\.$").expect("ellipsis regex"));
static RE_PAREN_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]+\)$").expect("paren regex"));
static RE_DASH_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*[^-]+$").expect("dash regex"));

/// Title/link/image resolved for one raw feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub source_url: String,
    /// `None` when neither the social image nor the markup yields one; the
    /// caller applies the category placeholder.
    pub image_url: Option<String>,
}

/// First anchor tag in the fragment: `(href, inner text with nested tags stripped)`.
pub fn extract_link(html: &str) -> Option<(String, String)> {
    let caps = RE_ANCHOR.captures(html)?;
    let href = caps.get(1)?.as_str().to_string();
    let inner = RE_TAGS.replace_all(caps.get(2)?.as_str(), "").to_string();
    Some((href, inner))
}

/// First `<img src=…>` in the fragment.
pub fn extract_image(html: &str) -> Option<String> {
    RE_IMG
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode common HTML entities and strip the trailing junk GDELT headlines
/// carry: ellipses, parenthetical attributions `(Reuters)`, and `" - Source"`
/// suffixes. Ellipsis/parenthetical stripping loops until stable because the
/// two can stack in either order.
pub fn clean_title(raw: &str) -> String {
    let mut clean = html_escape::decode_html_entities(raw).trim().to_string();

    loop {
        let before = clean.len();
        clean = RE_PAREN_ATTR.replace(&clean, "").trim().to_string();
        clean = RE_ELLIPSIS.replace(&clean, "").trim().to_string();
        if clean.len() == before {
            break;
        }
    }

    RE_DASH_ATTR.replace(&clean, "").trim().to_string()
}

/// Resolve the display headline for one raw feature.
///
/// The feature `name` (or [`DEFAULT_TITLE`]) stands unless the markup contains
/// an anchor whose stripped inner text is longer than [`MIN_CANDIDATE_LEN`].
pub fn resolve_headline(
    name: Option<&str>,
    html: Option<&str>,
    url: Option<&str>,
    social_image: Option<&str>,
) -> Headline {
    let mut title = name.unwrap_or(DEFAULT_TITLE).to_string();
    let mut source_url = url.unwrap_or(UNRESOLVED_URL).to_string();
    let mut image_url = social_image.map(str::to_string);

    if let Some(html) = html {
        if let Some((href, inner)) = extract_link(html) {
            source_url = href;
            if inner.len() > MIN_CANDIDATE_LEN {
                title = clean_title(&inner);
            }
        }
        if image_url.is_none() {
            image_url = extract_image(html);
        }
    }

    Headline {
        title,
        source_url,
        image_url,
    }
}

/// Fixed per-category placeholder used when no real image was resolved.
pub fn fallback_image(category: Category) -> &'static str {
    match category {
        Category::Finance => {
            "https://images.unsplash.com/photo-1611974765270-ca12586343bb?auto=format&fit=crop&q=80&w=800"
        }
        Category::Tech => {
            "https://images.unsplash.com/photo-1518770660439-4636190af475?auto=format&fit=crop&q=80&w=800"
        }
        Category::Politics => {
            "https://images.unsplash.com/photo-1541872703-74c5963631df?auto=format&fit=crop&q=80&w=800"
        }
        Category::Conflict => {
            "https://images.unsplash.com/photo-1494412574643-35d3d4018519?auto=format&fit=crop&q=80&w=800"
        }
        Category::Disaster => {
            "https://images.unsplash.com/photo-1454789476662-b9774432158f?auto=format&fit=crop&q=80&w=800"
        }
        Category::Environment => {
            "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05?auto=format&fit=crop&q=80&w=800"
        }
        Category::Sports => {
            "https://images.unsplash.com/photo-1461896836934-ffe607ba8211?auto=format&fit=crop&q=80&w=800"
        }
        Category::Health => {
            "https://images.unsplash.com/photo-1505751172876-fa1923c5c528?auto=format&fit=crop&q=80&w=800"
        }
        _ => {
            "https://images.unsplash.com/photo-1451187580459-43490279c0fa?auto=format&fit=crop&q=80&w=800"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_decodes_and_strips_attribution() {
        let out = clean_title("Markets Rally Again&apos;s Big Day... (Reuters)");
        assert_eq!(out, "Markets Rally Again's Big Day");
    }

    #[test]
    fn clean_title_strips_dash_source_suffix() {
        assert_eq!(clean_title("Quake hits coast - CNN"), "Quake hits coast");
    }

    #[test]
    fn clean_title_handles_stacked_suffixes() {
        assert_eq!(clean_title("Headline (AP)..."), "Headline");
    }

    #[test]
    fn extract_link_strips_nested_tags() {
        let html = r#"<a href="https://x.test/a" target="_blank"><b>Big</b> story</a> more"#;
        let (href, inner) = extract_link(html).expect("anchor");
        assert_eq!(href, "https://x.test/a");
        assert_eq!(inner, "Big story");
    }

    #[test]
    fn resolve_headline_rejects_short_candidates() {
        let html = r#"<a href="https://x.test/a">X</a>"#;
        let h = resolve_headline(Some("Feature Name"), Some(html), None, None);
        // Link is still taken; the 1-char candidate is not.
        assert_eq!(h.title, "Feature Name");
        assert_eq!(h.source_url, "https://x.test/a");
    }

    #[test]
    fn resolve_headline_defaults_without_name() {
        let h = resolve_headline(None, None, None, None);
        assert_eq!(h.title, DEFAULT_TITLE);
        assert_eq!(h.source_url, UNRESOLVED_URL);
        assert!(h.image_url.is_none());
    }

    #[test]
    fn resolve_headline_pulls_image_from_markup() {
        let html = r#"<a href="https://x.test/a">A long enough headline</a><img src="https://x.test/i.jpg">"#;
        let h = resolve_headline(Some("n"), Some(html), None, None);
        assert_eq!(h.image_url.as_deref(), Some("https://x.test/i.jpg"));
    }
}
