// tests/enrich_ai.rs
//
// Batch label correction: valid corrections land on matching ids, everything
// else passes through untouched, and a bad reply is a clean no-op.

use global_pulse::ai::{DisabledCompletion, MockCompletion};
use global_pulse::enrich::enrich_events;
use global_pulse::feed::synthetic;
use global_pulse::model::{Category, Sentiment};
use chrono::Utc;

#[tokio::test]
async fn valid_corrections_are_applied_by_id() {
    let events = synthetic::generate(Utc::now());
    let target = events[0].id.clone();

    let reply = format!(
        r#"{{"corrections": [{{"id": "{target}", "category": "conflict", "sentiment": "negative"}}]}}"#
    );
    let ai = MockCompletion::new(&reply);

    let enriched = enrich_events(events.clone(), &ai).await;

    assert_eq!(ai.call_count(), 1);
    assert_eq!(enriched[0].category, Category::Conflict);
    assert_eq!(enriched[0].sentiment, Sentiment::Negative);
    // Untargeted records keep their labels.
    for (before, after) in events.iter().zip(enriched.iter()).skip(1) {
        assert_eq!(before.category, after.category);
        assert_eq!(before.sentiment, after.sentiment);
    }
}

#[tokio::test]
async fn unknown_labels_and_ids_are_ignored() {
    let events = synthetic::generate(Utc::now());
    let target = events[1].id.clone();

    let reply = format!(
        r#"{{"corrections": [
            {{"id": "no-such-id", "category": "conflict"}},
            {{"id": "{target}", "category": "astrology", "sentiment": "negative"}}
        ]}}"#
    );
    let ai = MockCompletion::new(&reply);

    let enriched = enrich_events(events.clone(), &ai).await;

    // Bad category label dropped, valid sentiment still applied.
    assert_eq!(enriched[1].category, events[1].category);
    assert_eq!(enriched[1].sentiment, Sentiment::Negative);
}

#[tokio::test]
async fn unparseable_reply_leaves_events_unchanged() {
    let events = synthetic::generate(Utc::now());
    let ai = MockCompletion::new("not json at all");

    let enriched = enrich_events(events.clone(), &ai).await;
    assert_eq!(enriched, events);
}

#[tokio::test]
async fn disabled_ai_is_a_no_op_without_calling() {
    let events = synthetic::generate(Utc::now());
    let enriched = enrich_events(events.clone(), &DisabledCompletion).await;
    assert_eq!(enriched, events);
}
