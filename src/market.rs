//! Crypto ticker: CoinGecko simple-price for BTC/ETH behind an explicit
//! `{value, fetched_at}` cache with a 60-second TTL, to respect the free
//! tier's rate limits. Rate-limit responses and transport errors serve the
//! last-known-good value; nothing here is a hard error.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{MarketQuote, Trend};

const CACHE_TTL: Duration = Duration::from_secs(60);
const QUERY: &str = "ids=bitcoin,ethereum&vs_currencies=usd&include_24hr_change=true";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuotes {
    pub btc: MarketQuote,
    pub eth: MarketQuote,
}

#[derive(Debug, Deserialize)]
struct PriceResp {
    bitcoin: Coin,
    ethereum: Coin,
}

#[derive(Debug, Deserialize)]
struct Coin {
    usd: f64,
    #[serde(default)]
    usd_24h_change: f64,
}

struct CacheEntry {
    fetched_at: Instant,
    quotes: CryptoQuotes,
}

pub struct CryptoTicker {
    http: reqwest::Client,
    base: String,
    cache: Mutex<Option<CacheEntry>>,
}

impl CryptoTicker {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self {
            http,
            base,
            cache: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<CryptoQuotes> {
        self.cache
            .lock()
            .expect("ticker cache poisoned")
            .as_ref()
            .map(|e| e.quotes.clone())
    }

    fn fresh_cached(&self) -> Option<CryptoQuotes> {
        self.cache
            .lock()
            .expect("ticker cache poisoned")
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < CACHE_TTL)
            .map(|e| e.quotes.clone())
    }

    /// Current quotes: fresh cache, else a live fetch, else the last-known
    /// value (stale or `None` when there never was one).
    pub async fn quotes(&self) -> Option<CryptoQuotes> {
        if let Some(hit) = self.fresh_cached() {
            return Some(hit);
        }

        let url = format!("{}?{QUERY}", self.base);
        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = ?e, "crypto fetch failed; serving last-known quotes");
                return self.cached();
            }
        };

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("crypto price rate limit; serving last-known quotes");
            return self.cached();
        }
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "crypto price endpoint unhappy");
            return self.cached();
        }

        let data: PriceResp = match resp.json().await {
            Ok(d) => d,
            Err(e) => {
                warn!(error = ?e, "crypto price body unparseable");
                return self.cached();
            }
        };

        let quotes = CryptoQuotes {
            btc: quote("BTC", "Bitcoin", &data.bitcoin),
            eth: quote("ETH", "Ethereum", &data.ethereum),
        };

        *self.cache.lock().expect("ticker cache poisoned") = Some(CacheEntry {
            fetched_at: Instant::now(),
            quotes: quotes.clone(),
        });
        Some(quotes)
    }
}

fn quote(symbol: &str, name: &str, coin: &Coin) -> MarketQuote {
    MarketQuote {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: coin.usd,
        change: coin.usd_24h_change,
        trend: if coin.usd_24h_change >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        },
        last_updated: Utc::now(),
    }
}
