use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    client::{EndpointKind, WeatherSource},
    entity::{PrecipitationSummarySensor, WarningSensor, WeatherEntityState},
    model::{AirQualityNow, IndicesDailyItem},
};

/// Everything known about one location, refreshed one endpoint at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    pub weather: WeatherEntityState,
    pub air: Option<AirQualityNow>,
    pub warning: WarningSensor,
    pub precipitation: PrecipitationSummarySensor,
    pub indices: Vec<IndicesDailyItem>,
    pub last_refreshed: HashMap<EndpointKind, DateTime<Utc>>,
}

impl LocationState {
    /// Run the fetcher for `kind` and apply its result.
    pub async fn refresh(&mut self, source: &dyn WeatherSource, kind: EndpointKind, now: DateTime<Utc>) {
        debug!(endpoint = %kind, "Refreshing");

        match kind {
            EndpointKind::Observation => {
                let observation = source.observation().await;
                self.weather.update_observation(observation.as_ref());
            }
            EndpointKind::DailyForecast => self.weather.update_daily(&source.daily_forecast().await),
            EndpointKind::HourlyForecast => self.weather.update_hourly(&source.hourly_forecast().await),
            EndpointKind::AirQuality => {
                self.air = source.air_now().await;
                self.weather.update_air(self.air.as_ref());
            }
            EndpointKind::MinutelyPrecipitation => {
                self.precipitation =
                    PrecipitationSummarySensor::from_minutely(&source.minutely_precipitation().await);
            }
            EndpointKind::Warning => self.warning = WarningSensor::from_warnings(&source.warning_now().await),
            EndpointKind::Indices => self.indices = source.indices_1d().await,
        }

        self.last_refreshed.insert(kind, now);
    }

    /// Refresh every endpoint in turn.
    pub async fn refresh_all(&mut self, source: &dyn WeatherSource, now: DateTime<Utc>) {
        for kind in EndpointKind::all() {
            self.refresh(source, *kind, now).await;
        }
    }
}
