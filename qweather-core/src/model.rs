//! Field-for-field mirrors of the provider's JSON payloads.
//!
//! Numeric values arrive as strings and are kept that way; conversion happens in
//! [`crate::entity`]. List fields default to empty.

use serde::{Deserialize, Serialize};

/// Current conditions (`/v7/weather/now`, `/v7/grid-weather/now`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeWeather {
    pub obs_time: String,
    pub temp: String,
    #[serde(default)]
    pub feels_like: Option<String>,
    pub icon: String,
    pub text: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    pub precip: String,
    pub pressure: String,
    #[serde(default)]
    pub vis: Option<String>,
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub dew: Option<String>,
}

/// One day of `/v7/weather/7d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub fx_date: String,
    #[serde(default)]
    pub sunrise: Option<String>,
    #[serde(default)]
    pub sunset: Option<String>,
    #[serde(default)]
    pub moonrise: Option<String>,
    #[serde(default)]
    pub moonset: Option<String>,
    #[serde(default)]
    pub moon_phase: Option<String>,
    #[serde(default)]
    pub moon_phase_icon: Option<String>,
    pub temp_max: String,
    pub temp_min: String,
    pub icon_day: String,
    pub text_day: String,
    pub icon_night: String,
    pub text_night: String,
    pub wind360_day: String,
    pub wind_dir_day: String,
    pub wind_scale_day: String,
    pub wind_speed_day: String,
    pub wind360_night: String,
    pub wind_dir_night: String,
    pub wind_scale_night: String,
    pub wind_speed_night: String,
    pub humidity: String,
    pub precip: String,
    pub pressure: String,
    #[serde(default)]
    pub vis: Option<String>,
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub uv_index: Option<String>,
}

/// One hour of `/v7/weather/24h`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub fx_time: String,
    pub temp: String,
    pub icon: String,
    pub text: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    #[serde(default)]
    pub pop: Option<String>,
    pub precip: String,
    pub pressure: String,
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub dew: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryPollutant {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAdvice {
    #[serde(default)]
    pub general_population: Option<String>,
    #[serde(default)]
    pub sensitive_population: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AqiHealth {
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub advice: HealthAdvice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityIndex {
    pub code: String,
    pub name: String,
    pub aqi: f64,
    pub aqi_display: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub color: Option<AirQualityColor>,
    #[serde(default)]
    pub primary_pollutant: Option<PrimaryPollutant>,
    #[serde(default)]
    pub health: Option<AqiHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutantSubIndex {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub aqi: Option<f64>,
    pub aqi_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pollutant {
    pub code: String,
    pub name: String,
    pub full_name: String,
    pub concentration: Concentration,
    #[serde(default)]
    pub sub_index: Option<PollutantSubIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
}

/// `/airquality/v1/now/{location_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityNow {
    #[serde(default)]
    pub indexes: Vec<AirQualityIndex>,
    #[serde(default)]
    pub pollutants: Vec<Pollutant>,
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl AirQualityNow {
    pub fn pollutant(&self, code: &str) -> Option<&Pollutant> {
        self.pollutants.iter().find(|p| p.code == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationType {
    Rain,
    Snow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutelyPrecipitationItem {
    pub fx_time: String,
    pub precip: String,
    #[serde(rename = "type")]
    pub kind: PrecipitationType,
}

/// `/v7/minutely/5m`. The empty value is `{summary: "", minutely: []}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinutelyPrecipitation {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub minutely: Vec<MinutelyPrecipitationItem>,
}

/// One entry of `/v7/warning/now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherWarning {
    pub id: String,
    #[serde(default)]
    pub sender: Option<String>,
    pub pub_time: String,
    pub title: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    pub status: String,
    pub severity: String,
    #[serde(default)]
    pub severity_color: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_name: String,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub certainty: Option<String>,
    pub text: String,
    #[serde(default)]
    pub related: Option<String>,
}

/// One entry of `/v7/indices/1d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicesDailyItem {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub level: String,
    pub category: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn realtime_weather_accepts_missing_optional_fields() {
        let now: RealtimeWeather = serde_json::from_value(json!({
            "obsTime": "2020-06-30T21:40+08:00",
            "temp": "24",
            "icon": "101",
            "text": "多云",
            "wind360": "123",
            "windDir": "东南风",
            "windScale": "1",
            "windSpeed": "3",
            "humidity": "72",
            "precip": "0.0",
            "pressure": "1003"
        }))
        .unwrap();

        assert_eq!(now.wind_dir, "东南风");
        assert_eq!(now.feels_like, None);
        assert_eq!(now.dew, None);
    }

    #[test]
    fn air_quality_lists_default_to_empty() {
        let air: AirQualityNow = serde_json::from_value(json!({})).unwrap();
        assert!(air.indexes.is_empty());
        assert!(air.pollutants.is_empty());
        assert!(air.stations.is_empty());
    }

    #[test]
    fn air_quality_finds_pollutant_by_code() {
        let air: AirQualityNow = serde_json::from_value(json!({
            "pollutants": [
                {"code": "pm2p5", "name": "PM 2.5", "fullName": "颗粒物", "concentration": {"value": 25.0, "unit": "μg/m3"}},
                {"code": "o3", "name": "O3", "fullName": "臭氧", "concentration": {"value": 61.0, "unit": "μg/m3"}}
            ]
        }))
        .unwrap();

        assert_eq!(air.pollutant("o3").map(|p| p.concentration.value), Some(61.0));
        assert!(air.pollutant("so2").is_none());
    }

    #[test]
    fn minutely_item_type_is_renamed() {
        let item: MinutelyPrecipitationItem =
            serde_json::from_value(json!({"fxTime": "2021-12-16T18:55+08:00", "precip": "0.15", "type": "rain"}))
                .unwrap();
        assert_eq!(item.kind, PrecipitationType::Rain);
    }

    #[test]
    fn warning_serializes_back_to_camel_case() {
        let warning = WeatherWarning {
            id: "1".into(),
            sender: None,
            pub_time: "2023-04-03T10:30+08:00".into(),
            title: "大风蓝色预警".into(),
            start_time: None,
            end_time: None,
            status: "active".into(),
            severity: "Minor".into(),
            severity_color: Some("Blue".into()),
            kind: "1006".into(),
            type_name: "大风".into(),
            urgency: None,
            certainty: None,
            text: "...".into(),
            related: None,
        };
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["pubTime"], "2023-04-03T10:30+08:00");
        assert_eq!(value["type"], "1006");
        assert_eq!(value["severityColor"], "Blue");
    }
}
