//! Item shop API client and response model.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("http: {0}")]
    Http(String),
    #[error("shop api error {status}: {body}")]
    Api { status: StatusCode, body: String },
}

fn shop_api_url() -> String {
    std::env::var("ATHENA_SHOP_API_URL")
        .unwrap_or_else(|_| "https://fortniteapi.io/v1/shop".to_string())
}

/// Fetch today's item shop. One attempt; any failure is fatal to the run.
/// Returns the raw JSON document, shaped into [`ShopResponse`] by the
/// builder so shape failures are reported there.
pub async fn fetch(
    http: &reqwest::Client,
    api_key: &str,
    language: &str,
) -> Result<serde_json::Value, ShopError> {
    let resp = http
        .get(shop_api_url())
        .header("Authorization", api_key)
        .query(&[("lang", language)])
        .send()
        .await
        .map_err(|e| ShopError::Http(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ShopError::Api { status, body });
    }

    resp.json().await.map_err(|e| ShopError::Http(e.to_string()))
}

/// The four item sections plus the completeness flag. Any missing section
/// key fails deserialization, which aborts the run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopResponse {
    pub featured: Vec<RawItem>,
    pub special_featured: Vec<RawItem>,
    pub daily: Vec<RawItem>,
    pub special_daily: Vec<RawItem>,
    pub full_shop: bool,
}

/// One catalog entry exactly as the API sent it. Every field is optional
/// here so a single malformed item never sinks the whole response;
/// per-item validation happens when the card is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    pub name: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub price: Option<u64>,
    pub image: Option<String>,
    pub icon: Option<String>,
}
