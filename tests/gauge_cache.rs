// tests/gauge_cache.rs
//
// Daily gauge cache semantics: one successful analysis per calendar day,
// deterministic fallback readings when the AI layer cannot answer, and no
// caching of fallbacks.

use global_pulse::ai::{DisabledCompletion, MockCompletion};
use global_pulse::feed::synthetic;
use global_pulse::gauge::DailyGauge;
use global_pulse::model::Volatility;
use chrono::Utc;

#[tokio::test]
async fn successful_reading_is_cached_for_the_day() {
    let ai = MockCompletion::new(r#"{"score": 72, "rationale": "Strait exercises expanded."}"#);
    let gauge = DailyGauge::new();
    let headlines = synthetic::generate(Utc::now());

    let first = gauge.read(&ai, &headlines).await;
    let second = gauge.read(&ai, &headlines).await;

    assert_eq!(ai.call_count(), 1, "second same-day read must hit the cache");
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap(),
        "cached reading must be byte-identical"
    );
    assert_eq!(first.score, 72);
    assert_eq!(first.volatility, Volatility::High);
}

#[tokio::test]
async fn empty_headlines_yield_neutral_no_data_reading() {
    let ai = MockCompletion::new(r#"{"score": 90, "rationale": "irrelevant"}"#);
    let gauge = DailyGauge::new();

    let reading = gauge.read(&ai, &[]).await;
    assert_eq!(ai.call_count(), 0, "no headlines, no analysis call");
    assert_eq!(reading.score, 50);
    assert_eq!(reading.volatility, Volatility::Medium);
}

#[tokio::test]
async fn disabled_ai_yields_failure_reading() {
    let gauge = DailyGauge::new();
    let headlines = synthetic::generate(Utc::now());

    let reading = gauge.read(&DisabledCompletion, &headlines).await;
    assert_eq!(reading.score, 30);
    assert_eq!(reading.volatility, Volatility::Low);
}

#[tokio::test]
async fn failure_readings_are_not_cached() {
    let gauge = DailyGauge::new();
    let headlines = synthetic::generate(Utc::now());

    // First read fails (disabled AI), second read with a working AI must
    // still run a fresh analysis.
    let failed = gauge.read(&DisabledCompletion, &headlines).await;
    assert_eq!(failed.score, 30);

    let ai = MockCompletion::new(r#"{"score": 55, "rationale": "Stable posture."}"#);
    let fresh = gauge.read(&ai, &headlines).await;
    assert_eq!(ai.call_count(), 1);
    assert_eq!(fresh.score, 55);
}

#[tokio::test]
async fn out_of_range_scores_are_clamped() {
    let ai = MockCompletion::new(r#"{"score": 400, "rationale": "Overcooked."}"#);
    let gauge = DailyGauge::new();
    let headlines = synthetic::generate(Utc::now());

    let reading = gauge.read(&ai, &headlines).await;
    assert_eq!(reading.score, 100);
    assert_eq!(reading.volatility, Volatility::Critical);
}
