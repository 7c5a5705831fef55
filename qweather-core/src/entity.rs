//! Host-facing state derived from fetched data.
//!
//! Pure mapping from the provider models to the values a home-automation host shows:
//! a weather entity with daily and hourly forecasts, a binary sensor for active
//! warnings and a sensor carrying the minutely precipitation summary.

use serde::{Deserialize, Serialize};

use crate::model::{
    AirQualityNow, DailyForecast, HourlyForecast, MinutelyPrecipitation, RealtimeWeather,
    WeatherWarning,
};

pub mod condition;

pub use condition::{Condition, condition_for_icon};

pub const ATTRIBUTION: &str = "Data provided by QWeather";
pub const MANUFACTURER: &str = "QWeather, Inc.";

/// Native units of every value below.
pub mod units {
    pub const TEMPERATURE: &str = "°C";
    pub const PRESSURE: &str = "hPa";
    pub const VISIBILITY: &str = "km";
    pub const PRECIPITATION: &str = "mm";
    pub const WIND_SPEED: &str = "km/h";
}

/// Parse a numeric string; absent or malformed values become `None`.
pub fn maybe_float(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

fn maybe_int(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    value.parse::<i64>().ok().or_else(|| value.parse::<f64>().ok().map(|v| v.round() as i64))
}

/// One forecast entry, daily or hourly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_templow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_bearing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_dew_point: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
}

impl Forecast {
    /// Daytime values of a daily forecast; `native_temperature` is the maximum.
    pub fn from_daily(daily: &DailyForecast) -> Self {
        Self {
            datetime: daily.fx_date.clone(),
            condition: condition_for_icon(&daily.icon_day),
            humidity: maybe_float(Some(&daily.humidity)),
            cloud_coverage: maybe_float(daily.cloud.as_deref()),
            native_precipitation: maybe_float(Some(&daily.precip)),
            native_pressure: maybe_float(Some(&daily.pressure)),
            native_temperature: maybe_float(Some(&daily.temp_max)),
            native_templow: maybe_float(Some(&daily.temp_min)),
            wind_bearing: maybe_float(Some(&daily.wind360_day)),
            native_wind_speed: maybe_float(Some(&daily.wind_speed_day)),
            uv_index: maybe_float(daily.uv_index.as_deref()),
            ..Self::default()
        }
    }

    pub fn from_hourly(hourly: &HourlyForecast) -> Self {
        Self {
            datetime: hourly.fx_time.clone(),
            condition: condition_for_icon(&hourly.icon),
            humidity: maybe_float(Some(&hourly.humidity)),
            precipitation_probability: maybe_int(hourly.pop.as_deref()),
            cloud_coverage: maybe_float(hourly.cloud.as_deref()),
            native_precipitation: maybe_float(Some(&hourly.precip)),
            native_pressure: maybe_float(Some(&hourly.pressure)),
            native_temperature: maybe_float(Some(&hourly.temp)),
            wind_bearing: maybe_float(Some(&hourly.wind360)),
            native_wind_speed: maybe_float(Some(&hourly.wind_speed)),
            native_dew_point: maybe_float(hourly.dew.as_deref()),
            ..Self::default()
        }
    }
}

/// State of the weather entity.
///
/// Each `update_*` applies one endpoint's result. An observation of `None` keeps the
/// previous current conditions; forecasts are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntityState {
    pub condition: Option<Condition>,
    pub humidity: Option<f64>,
    pub cloud_coverage: Option<i64>,
    pub wind_bearing: Option<f64>,
    pub native_pressure: Option<f64>,
    pub native_apparent_temperature: Option<f64>,
    pub native_temperature: Option<f64>,
    pub native_visibility: Option<f64>,
    pub native_wind_speed: Option<f64>,
    pub native_dew_point: Option<f64>,
    pub uv_index: Option<f64>,
    pub ozone: Option<f64>,
    /// Extra attribute: wind direction text.
    pub winddir: Option<String>,
    pub forecast_daily: Vec<Forecast>,
    pub forecast_hourly: Vec<Forecast>,
}

impl WeatherEntityState {
    pub fn update_observation(&mut self, now: Option<&RealtimeWeather>) {
        let Some(now) = now else {
            return;
        };

        self.condition = condition_for_icon(&now.icon);
        self.humidity = maybe_float(Some(&now.humidity));
        self.cloud_coverage = maybe_int(now.cloud.as_deref());
        self.wind_bearing = maybe_float(Some(&now.wind360));
        self.native_pressure = maybe_float(Some(&now.pressure));
        self.native_apparent_temperature = maybe_float(now.feels_like.as_deref());
        self.native_temperature = maybe_float(Some(&now.temp));
        self.native_visibility = maybe_float(now.vis.as_deref());
        self.native_wind_speed = maybe_float(Some(&now.wind_speed));
        self.native_dew_point = maybe_float(now.dew.as_deref());
        self.winddir = Some(now.wind_dir.clone());
    }

    /// The entity's UV index comes from today's entry.
    pub fn update_daily(&mut self, daily: &[DailyForecast]) {
        self.forecast_daily = daily.iter().map(Forecast::from_daily).collect();

        if let Some(today) = daily.first() {
            self.uv_index = maybe_float(today.uv_index.as_deref());
        }
    }

    pub fn update_hourly(&mut self, hourly: &[HourlyForecast]) {
        self.forecast_hourly = hourly.iter().map(Forecast::from_hourly).collect();
    }

    pub fn update_air(&mut self, air: Option<&AirQualityNow>) {
        self.ozone = air.and_then(|air| air.pollutant("o3")).map(|o3| o3.concentration.value);
    }
}

/// `{title, text}` attribute entry of the warning sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningSummary {
    pub title: String,
    pub text: String,
}

/// Binary sensor that is on while any weather warning is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningSensor {
    pub is_on: bool,
    pub warning: Vec<WarningSummary>,
}

impl WarningSensor {
    pub const KEY: &'static str = "weather_warning";

    pub fn from_warnings(warnings: &[WeatherWarning]) -> Self {
        Self {
            is_on: !warnings.is_empty(),
            warning: warnings
                .iter()
                .map(|w| WarningSummary { title: w.title.clone(), text: w.text.clone() })
                .collect(),
        }
    }
}

/// Sensor whose value is the minutely precipitation summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationSummarySensor {
    pub value: Option<String>,
}

impl PrecipitationSummarySensor {
    pub const KEY: &'static str = "minutely_precipitation_summary";

    pub fn from_minutely(minutely: &MinutelyPrecipitation) -> Self {
        let value = Some(minutely.summary.clone()).filter(|s| !s.is_empty());
        Self { value }
    }
}

/// Entity id of a location's sensor, e.g. `sensor.home_minutely_precipitation_summary`.
pub fn entity_id(platform: &str, location_name: &str, key: &str) -> String {
    let slug: String = location_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.split('_').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("_");
    format!("{platform}.{slug}_{key}")
}
