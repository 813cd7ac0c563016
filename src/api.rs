//! Public HTTP surface for the dashboard. Every handler returns a well-formed,
//! displayable payload — the pipeline's fallback chains mean there is no error
//! branch to surface here.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::ai::SharedCompletion;
use crate::archive::{ArticleStore, NewArticle};
use crate::enrich;
use crate::feed::FeedAdapter;
use crate::gauge::DailyGauge;
use crate::market::{CryptoQuotes, CryptoTicker};
use crate::model::{GlobalSentimentMetrics, NewsEvent, TensionReading};
use crate::normalize;
use crate::rank;

/// Default bound for the general map view.
const MAP_LIMIT: usize = 100;
/// Bound for the conflict ticker / gauge context.
const CONFLICT_LIMIT: usize = 20;
/// How many head-of-list stories get offered to the vault.
const ARCHIVE_LEN: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedAdapter>,
    pub ai: SharedCompletion,
    pub gauge: Arc<DailyGauge>,
    pub ticker: Arc<CryptoTicker>,
    pub archive: Arc<dyn ArticleStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(news))
        .route("/api/news/conflict", get(conflict_news))
        .route("/api/news/local", get(local_news))
        .route("/api/sentiment", get(global_sentiment))
        .route("/api/gauge", get(daily_gauge))
        .route("/api/market/crypto", get(crypto))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct NewsQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct LocalQuery {
    lat: f64,
    lng: f64,
}

/// General map view: ranked global stream, AI-corrected head, archived
/// fire-and-forget.
async fn news(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Json<Vec<NewsEvent>> {
    let events = state.feed.fetch_global().await;
    let ranked = rank::rank_events(events, Utc::now(), Some(q.limit.unwrap_or(MAP_LIMIT)));
    let enriched = enrich::enrich_events(ranked, state.ai.as_ref()).await;

    archive_head(state.archive.clone(), enriched.clone());
    Json(enriched)
}

/// Conflict ticker: major networks merged over the general stream so verified
/// coverage survives dedup.
async fn conflict_news(State(state): State<AppState>) -> Json<Vec<NewsEvent>> {
    Json(fetch_conflict_feed(&state).await)
}

/// Local breaking sidebar: recency alone ranks, empty on any lookup failure.
async fn local_news(
    State(state): State<AppState>,
    Query(q): Query<LocalQuery>,
) -> Json<Vec<NewsEvent>> {
    let events = state.feed.fetch_local(q.lat, q.lng).await;
    Json(rank::rank_local(events, Utc::now()))
}

async fn global_sentiment(State(state): State<AppState>) -> Json<GlobalSentimentMetrics> {
    let events = state.feed.fetch_global().await;
    let ranked = rank::rank_events(events, Utc::now(), Some(MAP_LIMIT));
    Json(crate::tension::analyze_global(&ranked, state.ai.as_ref()).await)
}

async fn daily_gauge(State(state): State<AppState>) -> Json<TensionReading> {
    let headlines = fetch_conflict_feed(&state).await;
    Json(state.gauge.read(state.ai.as_ref(), &headlines).await)
}

async fn crypto(State(state): State<AppState>) -> Json<Option<CryptoQuotes>> {
    Json(state.ticker.quotes().await)
}

/// Global + major-outlet streams fetched concurrently; a failure in one never
/// blocks the other (each already fails soft on its own).
async fn fetch_conflict_feed(state: &AppState) -> Vec<NewsEvent> {
    let (general, major) = tokio::join!(state.feed.fetch_global(), state.feed.fetch_major());
    let mut merged = major;
    merged.extend(general);
    rank::rank_events(merged, Utc::now(), Some(CONFLICT_LIMIT))
}

/// Offer the head of the ranked list to the vault without blocking the
/// response. Lookups dedup across sessions; store failures are already
/// swallowed by the trait impls.
fn archive_head(store: Arc<dyn ArticleStore>, events: Vec<NewsEvent>) {
    tokio::spawn(async move {
        for ev in events.into_iter().take(ARCHIVE_LEN) {
            if ev.source_url == normalize::UNRESOLVED_URL {
                continue;
            }
            if store.find_by_url(&ev.source_url).await.is_some() {
                continue;
            }
            store
                .insert(NewArticle {
                    source_url: ev.source_url,
                    title: ev.title,
                    summary: ev.summary,
                    category: ev.category.as_str().to_string(),
                    image_url: ev.image_url,
                    source_name: ev.location_name,
                })
                .await;
        }
    });
}
