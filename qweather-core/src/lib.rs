//! Core library for the `qweather` CLI.
//!
//! This crate defines:
//! - Configuration of locations, hosts and cooldowns
//! - The rate-limited QWeather client: request gate, response classification,
//!   cooldown policy and one fetcher per endpoint
//! - Shared domain models mirroring the provider's payloads
//! - Host-facing entity state derived from those models
//!
//! It is used by `qweather-cli`, but can also be embedded by a home-automation host
//! that owns scheduling.

pub mod client;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod geo;
pub mod model;

pub use client::{
    BlockedUntil, ClassifiedResponse, Cooldown, CooldownPolicy, CooldownScope, EndpointKind,
    QWeatherClient, WeatherSource, client_from_config,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientSettings, Config, LocationConfig};
pub use coordinator::LocationState;
pub use entity::{Condition, Forecast, PrecipitationSummarySensor, WarningSensor, WeatherEntityState};
pub use geo::{City, SetupError, lookup_city};
pub use model::{
    AirQualityNow, DailyForecast, HourlyForecast, IndicesDailyItem, MinutelyPrecipitation,
    RealtimeWeather, WeatherWarning,
};
