use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, error, warn};

use crate::{
    Config,
    clock::{Clock, SystemClock},
    config::{ClientSettings, LocationConfig},
    model::{
        AirQualityNow, DailyForecast, HourlyForecast, IndicesDailyItem, MinutelyPrecipitation,
        RealtimeWeather, WeatherWarning,
    },
};

pub mod classify;
pub mod cooldown;
pub mod endpoint;
pub mod policy;

pub use classify::{ClassifiedResponse, ProviderCode, classify};
pub use cooldown::{BlockedUntil, Cooldown, CooldownScope};
pub use endpoint::{ApiHost, Endpoint, EndpointKind};
pub use policy::{CooldownPolicy, next_local_midnight};

/// Everything the scheduler polls for one location.
///
/// None of these fail: when the provider cannot be reached, is cooling down, or
/// answers with something unusable, the endpoint's empty value comes back instead
/// and the reason is logged.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Current conditions; `None` when unavailable.
    async fn observation(&self) -> Option<RealtimeWeather>;

    async fn daily_forecast(&self) -> Vec<DailyForecast>;

    async fn hourly_forecast(&self) -> Vec<HourlyForecast>;

    /// `None` when unavailable or when the location has no city id.
    async fn air_now(&self) -> Option<AirQualityNow>;

    async fn minutely_precipitation(&self) -> MinutelyPrecipitation;

    async fn warning_now(&self) -> Vec<WeatherWarning>;

    async fn indices_1d(&self) -> Vec<IndicesDailyItem>;
}

/// QWeather client for one configured location.
///
/// Every request passes the shared [`Cooldown`] gate first; every response is
/// classified and may move the gate forward through the [`CooldownPolicy`].
#[derive(Debug, Clone)]
pub struct QWeatherClient {
    http: reqwest::Client,
    api_base: String,
    air_base: String,
    api_key: String,
    coordinates: String,
    location_id: Option<String>,
    grid_weather: bool,
    cooldown: Arc<Cooldown>,
    policy: CooldownPolicy,
    clock: Arc<dyn Clock>,
}

impl QWeatherClient {
    pub fn new(
        location: &LocationConfig,
        settings: &ClientSettings,
        cooldown: Arc<Cooldown>,
    ) -> Result<Self, reqwest::Error> {
        let http = settings.http_client()?;

        Ok(Self {
            http,
            api_base: settings.api_base_url(),
            air_base: settings.air_base_url(),
            api_key: location.api_key.clone(),
            coordinates: location.coordinates(),
            location_id: location.location_id.clone().filter(|id| !id.is_empty()),
            grid_weather: location.grid_weather,
            cooldown,
            policy: settings.cooldown_policy(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cooldown(&self) -> &Arc<Cooldown> {
        &self.cooldown
    }

    /// Query parameters: `location` and `key`, then endpoint overrides (which win).
    fn query<'a>(&'a self, overrides: &'a [(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![("location", self.coordinates.as_str()), ("key", self.api_key.as_str())];
        for &(key, value) in overrides {
            match params.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => params.push((key, value)),
            }
        }
        params
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        let base = match endpoint.host {
            ApiHost::Weather => &self.api_base,
            ApiHost::AirQuality => &self.air_base,
        };
        let path = endpoint.render_path(self.grid_weather, self.location_id.as_deref().unwrap_or_default());
        format!("{base}/{path}")
    }

    /// Gate, request, classify, update the cooldown. `Some` only for a successful body.
    async fn request(&self, kind: EndpointKind) -> Option<Value> {
        if !self.cooldown.admits(kind, self.clock.now()) {
            debug!(endpoint = %kind, blocked_until = ?self.cooldown.blocked_until(kind), "Cooling down, request skipped");
            return None;
        }

        let endpoint = kind.endpoint();
        let url = self.url(endpoint);
        debug!(endpoint = %kind, url = %url, "GET request");

        let response = match self.http.get(&url).query(&self.query(endpoint.query)).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(endpoint = %kind, url = %url, error = %err, "Failed to send request to QWeather");
                return None;
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                warn!(endpoint = %kind, url = %url, error = %err, "Failed to read QWeather response body");
                return None;
            }
        };
        debug!(endpoint = %kind, status = %status, "Response received");

        self.settle(kind, &url, classify(status.as_u16(), &body))
    }

    fn settle(&self, kind: EndpointKind, url: &str, classified: ClassifiedResponse) -> Option<Value> {
        if let Some(until) = self.policy.blocked_until(&classified, self.clock.now()) {
            self.cooldown.block(kind, until);
        }

        match classified {
            ClassifiedResponse::Success(json) => return Some(json),
            ClassifiedResponse::Empty => {
                warn!(endpoint = %kind, url = %url, "Empty response from QWeather");
            }
            ClassifiedResponse::ClientError { code, detail } => match detail {
                Some(detail) => error!(endpoint = %kind, detail = %detail, "{code}; not retried until restart"),
                None => error!(endpoint = %kind, "{code}; not retried until restart"),
            },
            ClassifiedResponse::TransientError { code } => {
                warn!(endpoint = %kind, retry_in = ?self.policy.transient, "{code}");
            }
            ClassifiedResponse::QuotaExhausted => {
                warn!(
                    endpoint = %kind,
                    blocked_until = ?self.cooldown.blocked_until(kind),
                    "{}",
                    ProviderCode::QuotaExhausted
                );
            }
            ClassifiedResponse::Unknown { code } => {
                warn!(endpoint = %kind, retry_in = ?self.policy.unknown, "{}", ProviderCode::Other(code));
            }
        }
        None
    }
}

/// Take `field` out of a successful body and decode it; malformed payloads fail closed.
fn decode_field<T: DeserializeOwned>(kind: EndpointKind, mut json: Value, field: &str) -> Option<T> {
    let value = json.get_mut(field)?.take();
    decode(kind, value)
}

fn decode<T: DeserializeOwned>(kind: EndpointKind, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(endpoint = %kind, error = %err, "Failed to decode QWeather payload");
            None
        }
    }
}

#[async_trait]
impl WeatherSource for QWeatherClient {
    async fn observation(&self) -> Option<RealtimeWeather> {
        let kind = EndpointKind::Observation;
        let json = self.request(kind).await?;
        decode_field(kind, json, "now")
    }

    async fn daily_forecast(&self) -> Vec<DailyForecast> {
        let kind = EndpointKind::DailyForecast;
        match self.request(kind).await {
            Some(json) => decode_field(kind, json, "daily").unwrap_or_default(),
            None => Vec::new(),
        }
    }

    async fn hourly_forecast(&self) -> Vec<HourlyForecast> {
        let kind = EndpointKind::HourlyForecast;
        match self.request(kind).await {
            Some(json) => decode_field(kind, json, "hourly").unwrap_or_default(),
            None => Vec::new(),
        }
    }

    async fn air_now(&self) -> Option<AirQualityNow> {
        if self.location_id.is_none() {
            return None;
        }

        let kind = EndpointKind::AirQuality;
        let mut json = self.request(kind).await?;
        // Older responses wrap the snapshot in `now`; the v1 API returns it at top level.
        match json.get_mut("now").map(Value::take) {
            Some(now) => decode(kind, now),
            None => decode(kind, json),
        }
    }

    async fn minutely_precipitation(&self) -> MinutelyPrecipitation {
        let kind = EndpointKind::MinutelyPrecipitation;
        match self.request(kind).await {
            Some(json) => decode(kind, json).unwrap_or_default(),
            None => MinutelyPrecipitation::default(),
        }
    }

    async fn warning_now(&self) -> Vec<WeatherWarning> {
        let kind = EndpointKind::Warning;
        match self.request(kind).await {
            Some(json) => decode_field(kind, json, "warning").unwrap_or_default(),
            None => Vec::new(),
        }
    }

    async fn indices_1d(&self) -> Vec<IndicesDailyItem> {
        let kind = EndpointKind::Indices;
        match self.request(kind).await {
            Some(json) => decode_field(kind, json, "daily").unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

/// Construct a client for the named location (or the default one) with fresh cooldown state.
pub fn client_from_config(config: &Config, location: Option<&str>) -> anyhow::Result<QWeatherClient> {
    let (name, location) = config.location(location)?;

    if location.api_key.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "No API key configured for location '{name}'.\n\
             Hint: run `qweather configure {name}` and enter your API key."
        ));
    }

    let cooldown = Arc::new(Cooldown::new(config.client.cooldown_scope));
    let client = QWeatherClient::new(location, &config.client, cooldown)?;
    Ok(client)
}
