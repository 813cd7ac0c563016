//! Tension aggregation: a deterministic conflict-proximity baseline computed
//! from keyword hits and named-theater detection, plus an optional AI-enhanced
//! path that layers narrative on top of it.
//!
//! The baseline needs no external calls and always works; the AI supplies only
//! the qualitative fields, and the deterministic numbers always win for
//! `ww3Score`/`activeTheaters`/`primaryThreat`.

use serde::Deserialize;
use tracing::warn;

use crate::ai::{self, TextCompletion};
use crate::model::{
    GlobalSentimentMetrics, Importance, MarketOutlook, NewsEvent, Sentiment, TheaterStatus,
};

const BASE_SCORE: u32 = 15;
const SCORE_CAP: u32 = 99;
/// Headlines digested per AI analysis.
const DIGEST_LEN: usize = 30;

/// A named flashpoint: label plus the per-hit increment its detection adds.
struct Theater {
    label: &'static str,
    bump: u32,
    detect: fn(&str) -> bool,
}

static THEATERS: &[Theater] = &[
    Theater {
        label: "China-Taiwan Crisis",
        bump: 10,
        detect: |t| {
            (t.contains("china") || t.contains("chinese"))
                && (t.contains("taiwan")
                    || t.contains("invasion")
                    || t.contains("drill")
                    || t.contains("strait"))
        },
    },
    Theater {
        label: "Russia-Ukraine War",
        bump: 0,
        detect: |t| {
            t.contains("russia")
                && (t.contains("ukraine") || t.contains("missile") || t.contains("offensive"))
        },
    },
    Theater {
        label: "Israel-Multi-Front War",
        bump: 5,
        detect: |t| {
            t.contains("israel")
                || t.contains("gaza")
                || t.contains("hamas")
                || t.contains("hezbollah")
                || t.contains("beirut")
        },
    },
    Theater {
        label: "Iran/Proxy Escalation",
        bump: 5,
        detect: |t| {
            t.contains("iran")
                || t.contains("yemen")
                || t.contains("houthi")
                || t.contains("red sea")
                || t.contains("drone")
        },
    },
    Theater {
        label: "Korean Peninsula",
        bump: 0,
        detect: |t| {
            t.contains("korea")
                && (t.contains("missile") || t.contains("north") || t.contains("kim"))
        },
    },
];

fn is_nuclear(t: &str) -> bool {
    t.contains("nuclear") || t.contains("atomic") || t.contains("icbm") || t.contains("warhead")
}

fn is_alliance(t: &str) -> bool {
    t.contains("nato") || t.contains("article 5") || t.contains("alliance")
}

fn snippet(title: &str) -> String {
    title.chars().take(40).collect::<String>()
}

/// Deterministic conflict-proximity read. Theater labels are collected into a
/// set (dedup by label, not by hit count); set size contributes +10 per
/// theater exactly once at the end.
pub fn theater_status(events: &[NewsEvent]) -> TheaterStatus {
    let mut score = BASE_SCORE;
    let mut theaters: Vec<&'static str> = Vec::new();
    let mut escalations: Vec<String> = Vec::new();
    let mut nuclear_threat = false;

    for ev in events {
        let t = ev.title.to_lowercase();

        if is_nuclear(&t) {
            score += 25;
            nuclear_threat = true;
            escalations.push(format!("Nuclear risk: {}...", snippet(&ev.title)));
        }
        if is_alliance(&t) {
            score += 15;
            escalations.push(format!("NATO alert: {}...", snippet(&ev.title)));
        }

        for theater in THEATERS {
            if (theater.detect)(&t) {
                if !theaters.contains(&theater.label) {
                    theaters.push(theater.label);
                }
                score += theater.bump;
            }
        }
    }

    score += 10 * theaters.len() as u32;
    score = score.min(SCORE_CAP);

    let mut defcon = 5u8;
    if score > 40 {
        defcon = 4;
    }
    if score > 60 {
        defcon = 3;
    }
    if score > 80 {
        defcon = 2;
    }
    if nuclear_threat {
        defcon = defcon.min(2);
    }

    let primary_threat = if nuclear_threat {
        "Nuclear Escalation"
    } else if theaters.len() > 1 {
        "Multi-Front Conflict"
    } else {
        "Regional Instability"
    };

    escalations.truncate(3);

    TheaterStatus {
        proximity_score: score as u8,
        active_theaters: theaters.iter().map(|s| s.to_string()).collect(),
        defcon,
        primary_threat: primary_threat.to_string(),
        recent_escalations: escalations,
        nuclear_threat,
    }
}

/// Pure local fallback: the density of negative and high-importance-negative
/// items shifts a tension value away from the 50 midpoint, clamped to [10,95].
pub fn local_metrics(events: &[NewsEvent]) -> GlobalSentimentMetrics {
    let mut tension: i32 = 50;
    let mut neg = 0usize;
    let mut pos = 0usize;

    for ev in events {
        match ev.sentiment {
            Sentiment::Negative => {
                neg += 1;
                if ev.importance == Importance::High {
                    // critical negative news weighs double
                    neg += 2;
                }
            }
            Sentiment::Positive => pos += 1,
            Sentiment::Neutral => {}
        }
    }

    let total = events.len().max(1) as f64;
    let neg_ratio = neg as f64 / total;
    let pos_ratio = pos as f64 / total;

    if neg_ratio > 0.3 {
        tension += 20;
    }
    if neg_ratio > 0.5 {
        tension += 20;
    }
    if pos_ratio > 0.6 {
        tension -= 30;
    }
    let tension = tension.clamp(10, 95) as u8;

    GlobalSentimentMetrics {
        global_tension_index: tension,
        defcon_level: if tension > 80 {
            2
        } else if tension > 60 {
            3
        } else {
            4
        },
        market_outlook: if tension > 70 {
            MarketOutlook::Bearish
        } else if tension < 40 {
            MarketOutlook::Bullish
        } else {
            MarketOutlook::Volatile
        },
        summary_report: format!(
            "Global systems detect {} instability. Sector analysis complete.",
            if neg_ratio > 0.5 { "elevated" } else { "moderate" }
        ),
        trending_topics: events
            .iter()
            .take(3)
            .map(|ev| format!("{}...", ev.title.chars().take(20).collect::<String>()))
            .collect(),
        strategic_insight: None,
        ww3_score: None,
        active_theaters: None,
        primary_threat: None,
    }
}

/// Shape expected inside the AI completion. Lenient: anything missing falls
/// back to a sane default before merging.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiSentimentReply {
    #[serde(default)]
    global_tension_index: f64,
    #[serde(default)]
    defcon_level: i64,
    #[serde(default)]
    market_outlook: String,
    #[serde(default)]
    summary_report: String,
    #[serde(default)]
    trending_topics: Vec<String>,
    #[serde(default)]
    strategic_insight: Option<String>,
}

fn digest(events: &[NewsEvent]) -> String {
    events
        .iter()
        .take(DIGEST_LEN)
        .map(|ev| format!("- {} ({})", ev.title, ev.category.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sentiment_prompt(headlines: &str) -> String {
    format!(
        r#"Analyze the following global news headlines as a high-tech "Global Stability Engine".

HEADLINES:
{headlines}

Task:
1. Calculate "Global Tension Index" (0-100). BE REACTIVE. If there is WAR/CONFLICT/CRISIS, score must be > 75. If peaceful, < 30. Do not default to 50.
2. Set DEFCON (5=Peace, 1=Nuke).
3. Predict Market (Bullish/Bearish/Volatile/Stable).
4. Write "Summary Report" (2 sentences, tactical style).
5. List 3 trending topics.
6. Provide "Strategic Insight" (1 sentence).

Return JSON ONLY.
{{
  "globalTensionIndex": number,
  "defconLevel": number,
  "marketOutlook": string,
  "summaryReport": string,
  "trendingTopics": string[],
  "strategicInsight": string
}}"#
    )
}

/// Aggregate read over the ranked event list. With no usable AI the local
/// heuristic answers; with AI, its narrative is merged over the deterministic
/// baseline. Any parse or network failure degrades to the local heuristic.
pub async fn analyze_global(
    events: &[NewsEvent],
    ai: &dyn TextCompletion,
) -> GlobalSentimentMetrics {
    if events.is_empty() || !ai.enabled() {
        return local_metrics(events);
    }

    let baseline = theater_status(events);

    let reply = match ai.complete(&sentiment_prompt(&digest(events))).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = ?e, "sentiment analysis call failed; using local heuristic");
            return local_metrics(events);
        }
    };

    let Some(parsed) = ai::extract_json::<AiSentimentReply>(&reply) else {
        warn!("sentiment analysis reply was not parseable; using local heuristic");
        return local_metrics(events);
    };

    GlobalSentimentMetrics {
        global_tension_index: parsed.global_tension_index.clamp(0.0, 100.0) as u8,
        defcon_level: parsed.defcon_level.clamp(1, 5) as u8,
        market_outlook: MarketOutlook::parse(&parsed.market_outlook)
            .unwrap_or(MarketOutlook::Volatile),
        summary_report: parsed.summary_report,
        trending_topics: parsed.trending_topics,
        strategic_insight: parsed.strategic_insight,
        ww3_score: Some(baseline.proximity_score),
        active_theaters: Some(baseline.active_theaters),
        primary_threat: Some(baseline.primary_threat),
    }
}
