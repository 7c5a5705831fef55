use std::time::Duration;

/// The endpoints polled for one configured location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Observation,
    DailyForecast,
    HourlyForecast,
    AirQuality,
    MinutelyPrecipitation,
    Warning,
    Indices,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Observation => "observation",
            EndpointKind::DailyForecast => "daily_forecast",
            EndpointKind::HourlyForecast => "hourly_forecast",
            EndpointKind::AirQuality => "air_now",
            EndpointKind::MinutelyPrecipitation => "minutely_precipitation",
            EndpointKind::Warning => "warning_now",
            EndpointKind::Indices => "indices_1d",
        }
    }

    pub const fn all() -> &'static [EndpointKind] {
        &[
            EndpointKind::Observation,
            EndpointKind::DailyForecast,
            EndpointKind::HourlyForecast,
            EndpointKind::AirQuality,
            EndpointKind::MinutelyPrecipitation,
            EndpointKind::Warning,
            EndpointKind::Indices,
        ]
    }

    /// How often the scheduler refreshes this endpoint.
    pub fn poll_interval(&self) -> Duration {
        const MINUTE: u64 = 60;
        let secs = match self {
            EndpointKind::Observation => 10 * MINUTE,
            EndpointKind::DailyForecast => 60 * MINUTE,
            EndpointKind::HourlyForecast => 30 * MINUTE,
            EndpointKind::AirQuality => 30 * MINUTE,
            EndpointKind::MinutelyPrecipitation => 10 * MINUTE,
            EndpointKind::Warning => 20 * MINUTE,
            EndpointKind::Indices => 12 * 60 * MINUTE,
        };
        Duration::from_secs(secs)
    }

    pub fn endpoint(&self) -> &'static Endpoint {
        match self {
            EndpointKind::Observation => &OBSERVATION,
            EndpointKind::DailyForecast => &DAILY_FORECAST,
            EndpointKind::HourlyForecast => &HOURLY_FORECAST,
            EndpointKind::AirQuality => &AIR_QUALITY,
            EndpointKind::MinutelyPrecipitation => &MINUTELY_PRECIPITATION,
            EndpointKind::Warning => &WARNING,
            EndpointKind::Indices => &INDICES,
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured host serves an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHost {
    Weather,
    AirQuality,
}

/// Immutable description of one provider endpoint.
///
/// `path` may contain `{weather_type}` (replaced by `weather` or `grid-weather`)
/// and `{location_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub host: ApiHost,
    pub path: &'static str,
    pub grid_variant: bool,
    pub query: &'static [(&'static str, &'static str)],
}

impl Endpoint {
    pub fn render_path(&self, grid_weather: bool, location_id: &str) -> String {
        let weather_type = if self.grid_variant && grid_weather { "grid-weather" } else { "weather" };
        self.path
            .replace("{weather_type}", weather_type)
            .replace("{location_id}", location_id)
    }
}

static OBSERVATION: Endpoint = Endpoint {
    kind: EndpointKind::Observation,
    host: ApiHost::Weather,
    path: "v7/{weather_type}/now",
    grid_variant: true,
    query: &[],
};

static DAILY_FORECAST: Endpoint = Endpoint {
    kind: EndpointKind::DailyForecast,
    host: ApiHost::Weather,
    path: "v7/{weather_type}/7d",
    grid_variant: true,
    query: &[],
};

static HOURLY_FORECAST: Endpoint = Endpoint {
    kind: EndpointKind::HourlyForecast,
    host: ApiHost::Weather,
    path: "v7/{weather_type}/24h",
    grid_variant: true,
    query: &[],
};

static AIR_QUALITY: Endpoint = Endpoint {
    kind: EndpointKind::AirQuality,
    host: ApiHost::AirQuality,
    path: "airquality/v1/now/{location_id}",
    grid_variant: false,
    query: &[],
};

static MINUTELY_PRECIPITATION: Endpoint = Endpoint {
    kind: EndpointKind::MinutelyPrecipitation,
    host: ApiHost::Weather,
    path: "v7/minutely/5m",
    grid_variant: false,
    query: &[],
};

static WARNING: Endpoint = Endpoint {
    kind: EndpointKind::Warning,
    host: ApiHost::Weather,
    path: "v7/warning/now",
    grid_variant: false,
    query: &[],
};

static INDICES: Endpoint = Endpoint {
    kind: EndpointKind::Indices,
    host: ApiHost::Weather,
    path: "v7/indices/1d",
    grid_variant: false,
    query: &[("type", "0")],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_paths_follow_grid_flag() {
        let now = EndpointKind::Observation.endpoint();
        assert_eq!(now.render_path(true, ""), "v7/grid-weather/now");
        assert_eq!(now.render_path(false, ""), "v7/weather/now");

        let daily = EndpointKind::DailyForecast.endpoint();
        assert_eq!(daily.render_path(true, ""), "v7/grid-weather/7d");
    }

    #[test]
    fn non_grid_endpoints_ignore_grid_flag() {
        let warning = EndpointKind::Warning.endpoint();
        assert_eq!(warning.render_path(true, ""), "v7/warning/now");
    }

    #[test]
    fn air_quality_path_embeds_location_id() {
        let air = EndpointKind::AirQuality.endpoint();
        assert_eq!(air.host, ApiHost::AirQuality);
        assert_eq!(air.render_path(true, "101020100"), "airquality/v1/now/101020100");
    }

    #[test]
    fn every_kind_maps_to_its_own_endpoint() {
        for kind in EndpointKind::all() {
            assert_eq!(kind.endpoint().kind, *kind);
        }
    }

    #[test]
    fn indices_request_all_types() {
        assert_eq!(EndpointKind::Indices.endpoint().query, &[("type", "0")]);
    }
}
