//! Global Pulse backend — binary entrypoint.
//! Boots the Axum HTTP server, wiring the feed adapter, AI layer, caches, and
//! the article vault into shared state.

use std::sync::Arc;

use global_pulse::ai;
use global_pulse::api::{self, AppState};
use global_pulse::archive::{ArticleStore, NoopArticleStore, RestArticleStore};
use global_pulse::config::{AiConfig, AppConfig};
use global_pulse::feed::FeedAdapter;
use global_pulse::gauge::DailyGauge;
use global_pulse::market::CryptoTicker;
use global_pulse::metrics::Metrics;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("global_pulse=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    let ai_cfg = AiConfig::load_or_default("config/ai.json");

    let metrics = Metrics::init();

    let completion = ai::build_completion(&ai_cfg);
    info!(provider = completion.provider_name(), "AI layer ready");

    let http = reqwest::Client::builder()
        .user_agent("global-pulse/0.1 (+github.com/global-pulse/global-pulse)")
        .build()
        .expect("reqwest client");

    let archive: Arc<dyn ArticleStore> = match (&cfg.supabase_url, &cfg.supabase_key) {
        (Some(url), Some(key)) => Arc::new(RestArticleStore::new(
            http.clone(),
            url.clone(),
            key.clone(),
        )),
        _ => {
            info!("no vault configured; archiving disabled");
            Arc::new(NoopArticleStore)
        }
    };

    let state = AppState {
        feed: Arc::new(FeedAdapter::from_config(&cfg)),
        ai: completion,
        gauge: Arc::new(DailyGauge::new()),
        ticker: Arc::new(CryptoTicker::new(http, cfg.coingecko_base.clone())),
        archive,
    };

    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "global-pulse listening");
    axum::serve(listener, router).await?;
    Ok(())
}
