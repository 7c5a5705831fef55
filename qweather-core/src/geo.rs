//! City lookup used while configuring a location.
//!
//! Unlike the polling fetchers, this probe reports failures to the caller so that
//! setup can tell the user what went wrong.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{client::ProviderCode, config::ClientSettings};

/// Errors raised by the setup probe.
#[derive(Debug, Error)]
pub enum SetupError {
    /// HTTP request failed.
    #[error("Failed to communicate with QWeather: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-200 HTTP status.
    #[error("QWeather city lookup failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// 200 carrying a legacy in-body error code.
    #[error("QWeather city lookup rejected: {0}")]
    Provider(ProviderCode),

    /// JSON parsing error.
    #[error("Failed to parse QWeather city lookup response: {0}")]
    Json(#[from] serde_json::Error),

    /// Lookup succeeded but returned no city.
    #[error("No city found near {0}")]
    NotFound(String),
}

/// A city returned by the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub adm1: Option<String>,
    #[serde(default)]
    pub adm2: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    location: Vec<City>,
}

/// Resolve coordinates to the nearest city.
#[instrument(skip(http, settings, api_key))]
pub async fn lookup_city(
    http: &reqwest::Client,
    settings: &ClientSettings,
    api_key: &str,
    longitude: f64,
    latitude: f64,
) -> Result<City, SetupError> {
    let url = format!("{}/v2/city/lookup", settings.geo_base_url());
    let location = format!("{longitude:.2},{latitude:.2}");

    let res = http.get(&url).query(&[("location", location.as_str()), ("key", api_key)]).send().await?;

    let status = res.status();
    let body = res.text().await?;
    debug!(status = %status, "City lookup response received");

    if status != reqwest::StatusCode::OK {
        return Err(SetupError::Status { status: status.as_u16(), body: truncate_body(&body) });
    }

    let parsed: LookupResponse = serde_json::from_str(&body)?;

    if let Some(code) = parsed.code.as_deref().filter(|code| *code != "200") {
        return Err(SetupError::Provider(ProviderCode::from_body_code(code)));
    }

    parsed.location.into_iter().next().ok_or(SetupError::NotFound(location))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
