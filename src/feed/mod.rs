//! Feed adapter: queries the GDELT geo 2.0 API in three modes (global,
//! location-scoped, major-outlet), converts raw geo features into normalized
//! [`NewsEvent`]s, and guarantees the global stream is never empty by falling
//! back to the deterministic synthetic set.
//!
//! Failure policy: the global stream falls back to synthetic data; the two
//! supplementary streams fail soft to an empty list. No error leaves this
//! module.

pub mod geocode;
pub mod synthetic;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::model::{Category, Importance, NewsEvent, Sentiment};
use crate::normalize;
use crate::rank;
use crate::sentiment;
use crate::{classify, feed::geocode::ReverseGeocoder};

/// Outlets queried by the major-network stream.
const MAJOR_DOMAINS: &str =
    "domain:cnn.com OR domain:bbc.com OR domain:reuters.com OR domain:aljazeera.com OR domain:apnews.com";

/// At this many or fewer surviving live events the global stream is topped up
/// with the synthetic set so consumers always see a populated map.
const MIN_LIVE_EVENTS: usize = 5;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_events_total", "Total events parsed from the feed.");
        describe_counter!(
            "feed_dropped_total",
            "Features dropped for missing geometry or name."
        );
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!(
            "feed_fallback_total",
            "Times the synthetic fallback set was used."
        );
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("feed_last_run_ts", "Unix ts of the last feed fetch.");
    });
}

// --- GDELT GeoJSON wire types ---

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    pub name: Option<String>,
    pub html: Option<String>,
    pub url: Option<String>,
    pub socialimage: Option<String>,
    pub location: Option<String>,
}

/// Which query mode produced a record; controls id namespace, summary
/// template, and importance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Global,
    Local,
    Major,
}

impl StreamMode {
    fn namespace(&self) -> &'static str {
        match self {
            StreamMode::Global => "gdelt",
            StreamMode::Local => "local",
            StreamMode::Major => "major",
        }
    }
}

pub struct FeedAdapter {
    http: reqwest::Client,
    gdelt_base: String,
    geocoder: ReverseGeocoder,
}

impl FeedAdapter {
    pub fn new(gdelt_base: String, geocode_base: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("global-pulse/0.1 (+github.com/global-pulse/global-pulse)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        let geocoder = ReverseGeocoder::new(http.clone(), geocode_base);
        Self {
            http,
            gdelt_base,
            geocoder,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.gdelt_base.clone(), cfg.geocode_base.clone())
    }

    async fn query(
        &self,
        query: &str,
        timespan: &str,
        max: Option<u32>,
    ) -> Result<FeatureCollection> {
        let mut params = vec![
            ("query", query.to_string()),
            ("format", "geojson".to_string()),
            ("timespan", timespan.to_string()),
        ];
        if let Some(max) = max {
            params.push(("max", max.to_string()));
        }

        let resp = self
            .http
            .get(&self.gdelt_base)
            .query(&params)
            .send()
            .await
            .context("feed request")?;
        if !resp.status().is_success() {
            bail!("feed status {}", resp.status());
        }
        resp.json::<FeatureCollection>().await.context("feed body")
    }

    /// Broad English-language stream over the last 24 hours, tone-filtered to
    /// significant events. Survivors are junk-filtered and deduped here, not
    /// just downstream, so the synthetic floor sees what will actually be
    /// displayable. Never returns an empty list.
    pub async fn fetch_global(&self) -> Vec<NewsEvent> {
        ensure_metrics_described();
        let now = Utc::now();
        gauge!("feed_last_run_ts").set(now.timestamp() as f64);

        match self.query("sourcelang:eng toneabs>5", "24h", None).await {
            Ok(fc) if !fc.features.is_empty() => {
                let live = events_from_features(&fc.features, StreamMode::Global, now, None);
                with_synthetic_floor(live, now)
            }
            Ok(_) => {
                warn!("feed returned zero features; using synthetic fallback");
                counter!("feed_fallback_total").increment(1);
                synthetic::generate(now)
            }
            Err(e) => {
                warn!(error = ?e, "global feed fetch failed; using synthetic fallback");
                counter!("feed_errors_total").increment(1);
                counter!("feed_fallback_total").increment(1);
                synthetic::generate(now)
            }
        }
    }

    /// Location-scoped stream: reverse-geocode first (the feed indexes by
    /// place name), then query that place over 48 hours. Fails soft to empty.
    pub async fn fetch_local(&self, lat: f64, lng: f64) -> Vec<NewsEvent> {
        ensure_metrics_described();
        let now = Utc::now();

        let place = match self.geocoder.lookup(lat, lng).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = ?e, "reverse geocode failed; local stream empty");
                counter!("feed_errors_total").increment(1);
                return Vec::new();
            }
        };
        let country = match place.country_name.as_deref() {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                debug!("no country for coordinates; local stream empty");
                return Vec::new();
            }
        };

        let query = format!("location:\"{country}\" sourcelang:eng");
        match self.query(&query, "48h", Some(30)).await {
            Ok(fc) => events_from_features(&fc.features, StreamMode::Local, now, Some(&place)),
            Err(e) => {
                warn!(error = ?e, %country, "local feed fetch failed");
                counter!("feed_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    /// Major-broadcaster stream: trusted outlet domains, 4-hour window, all
    /// results forced high importance. Fails soft to empty.
    pub async fn fetch_major(&self) -> Vec<NewsEvent> {
        ensure_metrics_described();
        let now = Utc::now();

        let query = format!("({MAJOR_DOMAINS}) sourcelang:eng toneabs>3");
        match self.query(&query, "4h", Some(50)).await {
            Ok(fc) => events_from_features(&fc.features, StreamMode::Major, now, None),
            Err(e) => {
                warn!(error = ?e, "major network fetch failed");
                counter!("feed_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

/// Enforce the global stream floor on what will actually survive display
/// filtering. Geo feature names are often bare place names, so a batch can
/// parse fine and still be all junk; the floor has to look at the filtered
/// set. No survivors replaces the batch with the synthetic set; a thin batch
/// (at most [`MIN_LIVE_EVENTS`]) gets the synthetic set appended.
fn with_synthetic_floor(live: Vec<NewsEvent>, now: DateTime<Utc>) -> Vec<NewsEvent> {
    let mut events = rank::dedup_events(live);
    if events.is_empty() {
        warn!("no live events survived filtering; using synthetic fallback");
        counter!("feed_fallback_total").increment(1);
        return synthetic::generate(now);
    }
    if events.len() <= MIN_LIVE_EVENTS {
        warn!(
            kept = events.len(),
            "global stream thin; topping up with synthetic set"
        );
        counter!("feed_fallback_total").increment(1);
        events.extend(synthetic::generate(now));
    }
    events
}

/// Convert raw features into events. Features with missing/invalid geometry
/// are dropped silently — a normal filtering outcome, not an error. The
/// supplementary streams additionally require a feature name.
pub fn events_from_features(
    features: &[Feature],
    mode: StreamMode,
    now: DateTime<Utc>,
    place: Option<&geocode::GeoPlace>,
) -> Vec<NewsEvent> {
    let t0 = std::time::Instant::now();
    let mut out = Vec::with_capacity(features.len());
    let mut dropped = 0usize;

    for (idx, f) in features.iter().enumerate() {
        match event_from_feature(f, mode, idx, now, place) {
            Some(ev) => out.push(ev),
            None => dropped += 1,
        }
    }

    histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("feed_events_total").increment(out.len() as u64);
    counter!("feed_dropped_total").increment(dropped as u64);
    out
}

fn event_from_feature(
    f: &Feature,
    mode: StreamMode,
    idx: usize,
    now: DateTime<Utc>,
    place: Option<&geocode::GeoPlace>,
) -> Option<NewsEvent> {
    let coords = &f.geometry.as_ref()?.coordinates;
    if coords.len() < 2 {
        return None;
    }
    let (lng, lat) = (coords[0], coords[1]);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }

    let props = &f.properties;
    if mode != StreamMode::Global && props.name.is_none() {
        return None;
    }

    let headline = normalize::resolve_headline(
        props.name.as_deref(),
        props.html.as_deref(),
        props.url.as_deref(),
        props.socialimage.as_deref(),
    );

    let raw_text = format!(
        "{} {}",
        props.name.as_deref().unwrap_or_default(),
        props.html.as_deref().unwrap_or_default()
    );
    let category = classify::classify(&raw_text);

    let (summary, location_name, sentiment, importance) = match mode {
        StreamMode::Global => (
            format!(
                "Reporting on: {}. Location: {}. Source: Global Intelligence Stream.",
                headline.title,
                props.location.as_deref().unwrap_or("Unknown")
            ),
            props
                .name
                .clone()
                .or_else(|| props.location.clone())
                .unwrap_or_else(|| "Unknown Sector".to_string()),
            sentiment::assign(category, &raw_text),
            if headline.title.len() > 40
                && matches!(category, Category::Conflict | Category::Politics)
            {
                Importance::High
            } else {
                Importance::Medium
            },
        ),
        StreamMode::Local => {
            let country = place
                .and_then(|p| p.country_name.as_deref())
                .unwrap_or("Unknown");
            let near = place
                .and_then(|p| p.locality.as_deref())
                .filter(|l| !l.is_empty())
                .unwrap_or(country);
            (
                format!(
                    "Local Report ({country}): {}. Detected near {near}.",
                    headline.title
                ),
                props.name.clone().unwrap_or_else(|| country.to_string()),
                Sentiment::Neutral,
                Importance::Medium,
            )
        }
        StreamMode::Major => (
            format!("Breaking Report from Major Network: {}", headline.title),
            props
                .location
                .clone()
                .unwrap_or_else(|| "Global".to_string()),
            Sentiment::Neutral,
            Importance::High,
        ),
    };

    let image_url = match mode {
        // only the global stream trusts scraped/social images
        StreamMode::Global => headline
            .image_url
            .unwrap_or_else(|| normalize::fallback_image(category).to_string()),
        _ => normalize::fallback_image(category).to_string(),
    };

    Some(NewsEvent {
        id: format!(
            "{}-{idx}-{}",
            mode.namespace(),
            now.timestamp_millis()
        ),
        title: headline.title,
        summary,
        lat,
        lng,
        location_name,
        category,
        sentiment,
        importance,
        timestamp: now,
        source_url: headline.source_url,
        image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: Option<&str>, html: Option<&str>, coords: Option<Vec<f64>>) -> Feature {
        Feature {
            geometry: coords.map(|coordinates| Geometry { coordinates }),
            properties: Properties {
                name: name.map(str::to_string),
                html: html.map(str::to_string),
                url: None,
                socialimage: None,
                location: Some("Testville".to_string()),
            },
        }
    }

    #[test]
    fn invalid_geometry_is_dropped_silently() {
        let features = vec![
            feature(Some("Valid event headline"), None, Some(vec![10.0, 20.0])),
            feature(Some("No geometry"), None, None),
            feature(Some("Bad latitude"), None, Some(vec![10.0, 120.0])),
        ];
        let out = events_from_features(&features, StreamMode::Global, Utc::now(), None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Valid event headline");
    }

    #[test]
    fn supplementary_streams_require_a_name() {
        let features = vec![feature(None, None, Some(vec![10.0, 20.0]))];
        assert!(events_from_features(&features, StreamMode::Major, Utc::now(), None).is_empty());
        // global keeps it with the default title
        let out = events_from_features(&features, StreamMode::Global, Utc::now(), None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, normalize::DEFAULT_TITLE);
    }

    #[test]
    fn anchor_headline_overrides_feature_name() {
        let html = r#"<a href="https://news.test/story">Missile strike reported near border town</a>"#;
        let features = vec![feature(Some("Border Region"), Some(html), Some(vec![5.0, 5.0]))];
        let out = events_from_features(&features, StreamMode::Global, Utc::now(), None);
        assert_eq!(out[0].title, "Missile strike reported near border town");
        assert_eq!(out[0].source_url, "https://news.test/story");
        assert_eq!(out[0].category, Category::Conflict);
        assert_eq!(out[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn major_mode_forces_high_importance() {
        let features = vec![feature(
            Some("Quiet diplomatic meeting wraps up"),
            None,
            Some(vec![0.0, 0.0]),
        )];
        let out = events_from_features(&features, StreamMode::Major, Utc::now(), None);
        assert_eq!(out[0].importance, Importance::High);
        assert!(out[0].id.starts_with("major-"));
    }

    #[test]
    fn all_junk_batch_is_replaced_by_synthetic_set() {
        // Geo feature names are frequently bare place names; they parse into
        // valid events but every title is too short to survive filtering.
        let features: Vec<Feature> = (0..12)
            .map(|i| {
                let name = format!("Sector {i:02}");
                feature(Some(&name), None, Some(vec![10.0, 20.0]))
            })
            .collect();
        let now = Utc::now();
        let live = events_from_features(&features, StreamMode::Global, now, None);
        assert_eq!(live.len(), 12, "short-named features parse fine");

        let floored = with_synthetic_floor(live, now);
        assert!(floored.iter().all(|ev| ev.id.starts_with("sim-")));

        // End to end: the displayable stream is still populated.
        let ranked = rank::rank_events(floored, now, Some(100));
        assert!(ranked.len() >= 10);
    }

    #[test]
    fn thin_batch_is_topped_up_not_replaced() {
        let now = Utc::now();
        let features: Vec<Feature> = (0..3)
            .map(|i| {
                let name = format!("Measure {i} clears parliament committee stage");
                feature(Some(&name), None, Some(vec![10.0, 20.0]))
            })
            .collect();
        let live = events_from_features(&features, StreamMode::Global, now, None);
        let floored = with_synthetic_floor(live, now);

        assert_eq!(floored.len(), 13, "3 live + 10 synthetic");
        assert!(floored[0].id.starts_with("gdelt-"), "live events stay first");
        assert!(floored[12].id.starts_with("sim-"));
    }

    #[test]
    fn healthy_batch_is_left_alone() {
        let now = Utc::now();
        let features: Vec<Feature> = (0..6)
            .map(|i| {
                let name = format!("Region {i} reports steady development progress");
                feature(Some(&name), None, Some(vec![10.0, 20.0]))
            })
            .collect();
        let live = events_from_features(&features, StreamMode::Global, now, None);
        let floored = with_synthetic_floor(live, now);

        assert_eq!(floored.len(), 6);
        assert!(floored.iter().all(|ev| ev.id.starts_with("gdelt-")));
    }

    #[test]
    fn ids_are_namespaced_per_mode() {
        let features = vec![feature(Some("Some ordinary headline"), None, Some(vec![1.0, 1.0]))];
        let g = events_from_features(&features, StreamMode::Global, Utc::now(), None);
        let l = events_from_features(
            &features,
            StreamMode::Local,
            Utc::now(),
            Some(&geocode::GeoPlace {
                country_name: Some("Testland".into()),
                locality: None,
            }),
        );
        assert!(g[0].id.starts_with("gdelt-"));
        assert!(l[0].id.starts_with("local-"));
    }
}
