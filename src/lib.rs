// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod ai;
pub mod api;
pub mod archive;
pub mod classify;
pub mod config;
pub mod enrich;
pub mod feed;
pub mod gauge;
pub mod market;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod sentiment;
pub mod tension;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::model::{
    Category, GlobalSentimentMetrics, Importance, NewsEvent, Sentiment, TensionReading,
    TheaterStatus, Volatility,
};
