//! Twitter publish client: OAuth 1.0a signed credential check, media
//! upload and status update.

use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use reqwest::StatusCode;
use sha1::Sha1;
use thiserror::Error;
use tracing::info;

use crate::config::TwitterConfig;

const VERIFY_URL: &str = "https://api.twitter.com/1.1/account/verify_credentials.json";
const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const STATUS_UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("http: {0}")]
    Http(String),
    #[error("twitter api error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to read {path}: {source}")]
    Media {
        path: String,
        source: std::io::Error,
    },
    #[error("unexpected media upload response: {0}")]
    MediaId(String),
}

/// Post the saved poster. Caption carries the date and, when configured,
/// the support-a-creator promo line.
pub async fn tweet(
    http: &reqwest::Client,
    creds: &TwitterConfig,
    date: &str,
    support_code: Option<&str>,
    image_path: &str,
) -> Result<(), PublishError> {
    verify_credentials(http, creds).await?;

    let media_id = upload_media(http, creds, image_path).await?;
    let status = caption(date, support_code);

    let params = [("status", status.as_str()), ("media_ids", media_id.as_str())];
    let header = auth_header(creds, "POST", STATUS_UPDATE_URL, &params);
    let resp = http
        .post(STATUS_UPDATE_URL)
        .header("Authorization", header)
        .form(&params)
        .send()
        .await
        .map_err(|e| PublishError::Http(e.to_string()))?;
    check(resp).await?;

    info!("Tweeted item shop");
    Ok(())
}

fn caption(date: &str, support_code: Option<&str>) -> String {
    let mut body = format!("Battle Royale - #Fortnite Item Shop | {date}");
    if let Some(code) = support_code {
        body = format!("{body}\n\nUse code: {code} in the item shop!");
    }
    body
}

async fn verify_credentials(
    http: &reqwest::Client,
    creds: &TwitterConfig,
) -> Result<(), PublishError> {
    let header = auth_header(creds, "GET", VERIFY_URL, &[]);
    let resp = http
        .get(VERIFY_URL)
        .header("Authorization", header)
        .send()
        .await
        .map_err(|e| PublishError::Http(e.to_string()))?;
    check(resp).await.map(|_| ())
}

async fn upload_media(
    http: &reqwest::Client,
    creds: &TwitterConfig,
    path: &str,
) -> Result<String, PublishError> {
    let bytes = std::fs::read(path).map_err(|source| PublishError::Media {
        path: path.to_string(),
        source,
    })?;

    // Multipart body parameters are excluded from the OAuth signature.
    let header = auth_header(creds, "POST", MEDIA_UPLOAD_URL, &[]);
    let part = reqwest::multipart::Part::bytes(bytes).file_name("itemshop.jpeg");
    let form = reqwest::multipart::Form::new().part("media", part);
    let resp = http
        .post(MEDIA_UPLOAD_URL)
        .header("Authorization", header)
        .multipart(form)
        .send()
        .await
        .map_err(|e| PublishError::Http(e.to_string()))?;
    let body = check(resp).await?;

    let json: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| PublishError::MediaId(e.to_string()))?;
    json.get("media_id_string")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or(PublishError::MediaId(body))
}

async fn check(resp: reqwest::Response) -> Result<String, PublishError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(PublishError::Api { status, body });
    }
    Ok(body)
}

/// RFC 3986 percent-encoding, the variant OAuth signing requires.
fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn auth_header(
    creds: &TwitterConfig,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
) -> String {
    let nonce: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = Utc::now().timestamp().to_string();

    let mut oauth: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), creds.api_key.clone()),
        ("oauth_nonce".into(), nonce),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp),
        ("oauth_token".into(), creds.access_token.clone()),
        ("oauth_version".into(), "1.0".into()),
    ];

    let mut signed: Vec<(String, String)> = oauth.clone();
    signed.extend(
        request_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    let signature = sign(method, url, &signed, &creds.api_secret, &creds.access_secret);
    oauth.push(("oauth_signature".into(), signature));

    let fields = oauth
        .iter()
        .map(|(k, v)| format!(r#"{}="{}""#, percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

/// HMAC-SHA1 over the RFC 5849 signature base string.
fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str,
) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();
    let param_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let base = format!(
        "{method}&{}&{}",
        percent_encode(url),
        percent_encode(&param_string)
    );

    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC-SHA1 accepts keys of any length");
    mac.update(base.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_without_code() {
        assert_eq!(
            caption("3 August 2026", None),
            "Battle Royale - #Fortnite Item Shop | 3 August 2026"
        );
    }

    #[test]
    fn caption_with_support_code() {
        let c = caption("3 August 2026", Some("creator"));
        assert!(c.starts_with("Battle Royale - #Fortnite Item Shop | 3 August 2026"));
        assert!(c.ends_with("Use code: creator in the item shop!"));
    }

    #[test]
    fn percent_encoding_is_rfc3986() {
        assert_eq!(percent_encode("a b&c"), "a%20b%26c");
        assert_eq!(percent_encode("safe-._~"), "safe-._~");
    }

    // Reference vector from the RFC 5849 / Twitter signing walkthrough.
    #[test]
    fn signature_matches_known_vector() {
        let params = vec![
            ("include_entities".to_string(), "true".to_string()),
            (
                "oauth_consumer_key".to_string(),
                "xvz1evFS4wEEPTGEFPHBog".to_string(),
            ),
            (
                "oauth_nonce".to_string(),
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            ),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), "1318622958".to_string()),
            (
                "oauth_token".to_string(),
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            ),
            ("oauth_version".to_string(), "1.0".to_string()),
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
        ];
        let signature = sign(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }
}
