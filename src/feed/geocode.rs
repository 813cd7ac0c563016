//! Reverse geocoding: the feed indexes by place name, not coordinates, so
//! location-scoped queries need a coordinates → country/locality lookup first.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Country/locality pair for one coordinate, best-effort.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPlace {
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
}

pub struct ReverseGeocoder {
    http: reqwest::Client,
    base: String,
}

impl ReverseGeocoder {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    pub async fn lookup(&self, lat: f64, lng: f64) -> Result<GeoPlace> {
        let url = format!(
            "{}?latitude={lat}&longitude={lng}&localityLanguage=en",
            self.base
        );
        let resp = self.http.get(&url).send().await.context("geocode request")?;
        if !resp.status().is_success() {
            bail!("geocode status {}", resp.status());
        }
        resp.json::<GeoPlace>().await.context("geocode body")
    }
}
