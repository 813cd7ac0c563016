//! Text-completion capability: provider abstraction with a disabled
//! implementation so AI presence stays a configuration concern. Consumers must
//! behave deterministically when `enabled()` is false or a call fails.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528:free";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Reasoning models leak `<think>` blocks into the content; strip them.
static RE_THINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("think regex"));

/// Free-text prompt in, free-text completion out.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    /// False means callers should not even attempt a call.
    fn enabled(&self) -> bool {
        true
    }
    fn provider_name(&self) -> &'static str;
}

pub type SharedCompletion = Arc<dyn TextCompletion>;

/// Factory: build a client according to config. Missing key or `enabled=false`
/// yields the disabled client — a silent degrade, not an error.
pub fn build_completion(cfg: &AiConfig) -> SharedCompletion {
    if !cfg.enabled || cfg.api_key.is_empty() {
        return Arc::new(DisabledCompletion);
    }
    Arc::new(OpenRouterClient::new(
        cfg.api_key.clone(),
        cfg.model.as_deref(),
    ))
}

/// OpenRouter chat-completions client.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("global-pulse/0.1 (+github.com/global-pulse/global-pulse)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl TextCompletion for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Global Pulse")
            .json(&req)
            .send()
            .await
            .context("openrouter request")?;

        if !resp.status().is_success() {
            bail!("openrouter status {}", resp.status());
        }

        let body: Resp = resp.json().await.context("openrouter body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        Ok(RE_THINK.replace_all(content, "").trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "openrouter"
    }
}

/// Used when no API key is configured; callers take their deterministic path.
pub struct DisabledCompletion;

#[async_trait]
impl TextCompletion for DisabledCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("text completion disabled")
    }
    fn enabled(&self) -> bool {
        false
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic mock for tests: fixed reply plus a call counter.
pub struct MockCompletion {
    pub reply: String,
    pub calls: AtomicUsize,
}

impl MockCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Extract a JSON object from a noisy completion: drop code fences, isolate
/// the first `{` through the last `}`, parse. `None` on any failure — parse
/// failures are a normal fallback trigger.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let stripped = text.replace("```json", "").replace("```", "");
    let first = stripped.find('{')?;
    let last = stripped.rfind('}')?;
    if last < first {
        return None;
    }
    serde_json::from_str(&stripped[first..=last]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Probe {
        score: u8,
        rationale: String,
    }

    #[test]
    fn extract_json_handles_fenced_chatty_output() {
        let raw = "Sure! ```json\n{\"score\":42,\"rationale\":\"x\"}\n```";
        let p: Probe = extract_json(raw).expect("json");
        assert_eq!(
            p,
            Probe {
                score: 42,
                rationale: "x".into()
            }
        );
    }

    #[test]
    fn extract_json_isolates_braces_in_prose() {
        let raw = "Here you go: {\"score\": 7, \"rationale\": \"calm\"} hope that helps";
        let p: Probe = extract_json(raw).expect("json");
        assert_eq!(p.score, 7);
    }

    #[test]
    fn extract_json_fails_soft() {
        assert!(extract_json::<Probe>("no json here").is_none());
        assert!(extract_json::<Probe>("{broken").is_none());
    }
}
