//! Daily gauge: wraps the headline-risk AI analysis with a date-keyed cache so
//! the expensive call runs at most once per calendar day. The cache is an
//! explicit injected object, invalidated naturally by date rollover; failures
//! return a neutral default and are never cached, so a later success can land.

use std::sync::Mutex;

use chrono::Local;
use serde::Deserialize;
use tracing::{info, warn};

use crate::ai::{self, TextCompletion};
use crate::model::{NewsEvent, TensionReading, Volatility};

/// Headlines digested per gauge analysis.
const DIGEST_LEN: usize = 10;

fn volatility_for(score: u8) -> Volatility {
    if score >= 80 {
        Volatility::Critical
    } else if score >= 60 {
        Volatility::High
    } else if score >= 40 {
        Volatility::Medium
    } else {
        Volatility::Low
    }
}

fn no_data_reading() -> TensionReading {
    TensionReading {
        score: 50,
        rationale: "Data unavailable. Holding neutral posture.".to_string(),
        volatility: Volatility::Medium,
    }
}

fn failure_reading() -> TensionReading {
    TensionReading {
        score: 30,
        rationale: "Analysis validation failed. Systems nominal.".to_string(),
        volatility: Volatility::Low,
    }
}

#[derive(Debug, Deserialize)]
struct GaugeReply {
    #[serde(default)]
    score: i64,
    #[serde(default)]
    rationale: String,
}

fn gauge_prompt(headlines: &str) -> String {
    format!(
        r#"Analyze the following top global news headlines for risk of MAJOR global conflict (World War III scenarios).

Headlines:
{headlines}

Instructions:
1. **Primary Indicators (High Weight)**:
   - **China/Taiwan**: Any signs of invasion, blockade, or direct US collision.
   - **NATO/Russia**: Direct engagement, Article 5 mentions, or tactical nukes.
   - **Iran/Israel**: Direct state-on-state strikes (beyond proxies) or nuclear expansion.
   - **Global Alliances**: North Korea sending troops, China arming Russia, etc.

2. **Scoring Model (0-100)**:
   - < 40: Regional conflicts only (normal baseline).
   - 40-60: Heightened rhetoric, major military drills, proxy escalation.
   - 60-80: Direct skirmishes between superpowers or breaking of major treaties.
   - > 80: Active declaration of war between nuclear powers or imminent invasion of Taiwan/Baltics.

3. **Output**:
Return a JSON object ONLY:
{{ "score": <0-100 integer>, "rationale": "<1 sharp sentence identifying the specific driver>" }}"#
    )
}

/// Process-local, date-keyed cache around the daily analysis.
pub struct DailyGauge {
    inner: Mutex<Option<(String, TensionReading)>>,
}

impl Default for DailyGauge {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyGauge {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    fn today_key() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    /// Cached reading for today, or a fresh analysis over the supplied
    /// (already ranked) conflict headlines. Never errors.
    pub async fn read(&self, ai: &dyn TextCompletion, headlines: &[NewsEvent]) -> TensionReading {
        let today = Self::today_key();

        {
            let guard = self.inner.lock().expect("gauge cache poisoned");
            if let Some((date, reading)) = guard.as_ref() {
                if *date == today {
                    info!("gauge: serving cached daily analysis");
                    return reading.clone();
                }
            }
        }

        if headlines.is_empty() {
            return no_data_reading();
        }
        if !ai.enabled() {
            return failure_reading();
        }

        let digest = headlines
            .iter()
            .take(DIGEST_LEN)
            .map(|h| format!("- {}", h.title))
            .collect::<Vec<_>>()
            .join("\n");

        let reply = match ai.complete(&gauge_prompt(&digest)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = ?e, "gauge analysis call failed");
                return failure_reading();
            }
        };
        let Some(parsed) = ai::extract_json::<GaugeReply>(&reply) else {
            warn!("gauge analysis reply was not parseable");
            return failure_reading();
        };

        let score = parsed.score.clamp(0, 100) as u8;
        let reading = TensionReading {
            score,
            rationale: if parsed.rationale.is_empty() {
                "AI analysis completed.".to_string()
            } else {
                parsed.rationale
            },
            volatility: volatility_for(score),
        };

        let mut guard = self.inner.lock().expect("gauge cache poisoned");
        *guard = Some((today, reading.clone()));
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatility_thresholds() {
        assert_eq!(volatility_for(10), Volatility::Low);
        assert_eq!(volatility_for(40), Volatility::Medium);
        assert_eq!(volatility_for(60), Volatility::High);
        assert_eq!(volatility_for(95), Volatility::Critical);
    }
}
