use std::fmt::Write;

use qweather_core::{
    EndpointKind, Forecast, LocationState,
    entity::{ATTRIBUTION, units},
};

fn value(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) => format!("{v}{unit}"),
        None => "-".to_string(),
    }
}

/// Full report for `qweather show`.
pub fn render(name: &str, state: &LocationState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {name} ==");
    for kind in EndpointKind::all() {
        out.push_str(&render_section(*kind, state));
    }
    let _ = writeln!(out, "{ATTRIBUTION}");
    out
}

/// One refreshed endpoint for `qweather watch`.
pub fn render_update(name: &str, kind: EndpointKind, state: &LocationState) -> String {
    let refreshed = state
        .last_refreshed
        .get(&kind)
        .map(|at| at.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    format!("[{refreshed}] {name}\n{}", render_section(kind, state))
}

fn render_section(kind: EndpointKind, state: &LocationState) -> String {
    let w = &state.weather;
    let mut out = String::new();

    match kind {
        EndpointKind::Observation => {
            let _ = writeln!(
                out,
                "Now: {}  {} (feels like {})  humidity {}  pressure {}",
                w.condition.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
                value(w.native_temperature, units::TEMPERATURE),
                value(w.native_apparent_temperature, units::TEMPERATURE),
                value(w.humidity, "%"),
                value(w.native_pressure, units::PRESSURE),
            );
            let _ = writeln!(
                out,
                "Wind: {} {}  visibility {}",
                w.winddir.as_deref().unwrap_or("-"),
                value(w.native_wind_speed, units::WIND_SPEED),
                value(w.native_visibility, units::VISIBILITY),
            );
        }
        EndpointKind::DailyForecast => {
            let _ = writeln!(out, "Daily (UV index {}):", value(w.uv_index, ""));
            for f in &w.forecast_daily {
                let _ = writeln!(out, "  {}", forecast_line(f));
            }
        }
        EndpointKind::HourlyForecast => {
            let _ = writeln!(out, "Hourly:");
            for f in &w.forecast_hourly {
                let _ = writeln!(out, "  {}", forecast_line(f));
            }
        }
        EndpointKind::AirQuality => match &state.air {
            Some(air) => {
                for index in &air.indexes {
                    let _ = writeln!(
                        out,
                        "Air: {} {} {}",
                        index.name,
                        index.aqi_display,
                        index.category.as_deref().unwrap_or("")
                    );
                }
                let _ = writeln!(out, "Ozone: {}", value(w.ozone, "μg/m3"));
            }
            None => {
                let _ = writeln!(out, "Air: -");
            }
        },
        EndpointKind::MinutelyPrecipitation => {
            let _ = writeln!(out, "Precipitation: {}", state.precipitation.value.as_deref().unwrap_or("-"));
        }
        EndpointKind::Warning => {
            if state.warning.is_on {
                for warning in &state.warning.warning {
                    let _ = writeln!(out, "WARNING: {}", warning.title);
                }
            } else {
                let _ = writeln!(out, "Warnings: none");
            }
        }
        EndpointKind::Indices => {
            for index in &state.indices {
                let _ = writeln!(out, "Index: {} {}", index.name, index.category);
            }
        }
    }

    out
}

fn forecast_line(f: &Forecast) -> String {
    let temp = match f.native_templow {
        Some(low) => format!("{}/{}", value(Some(low), ""), value(f.native_temperature, units::TEMPERATURE)),
        None => value(f.native_temperature, units::TEMPERATURE),
    };
    format!(
        "{}  {:<16} {}  precip {}",
        f.datetime,
        f.condition.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
        temp,
        value(f.native_precipitation, units::PRECIPITATION),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qweather_core::{Condition, WarningSensor, entity::WarningSummary};

    #[test]
    fn empty_state_renders_placeholders() {
        let text = render("home", &LocationState::default());
        assert!(text.starts_with("== home =="));
        assert!(text.contains("Air: -"));
        assert!(text.contains("Warnings: none"));
        assert!(text.contains("Precipitation: -"));
    }

    #[test]
    fn daily_line_shows_range() {
        let f = Forecast {
            datetime: "2021-11-15".into(),
            condition: Some(Condition::Cloudy),
            native_temperature: Some(12.0),
            native_templow: Some(-1.0),
            native_precipitation: Some(0.0),
            ..Forecast::default()
        };
        let line = forecast_line(&f);
        assert!(line.starts_with("2021-11-15  cloudy"));
        assert!(line.contains("-1/12°C"));
        assert!(line.contains("precip 0mm"));
    }

    #[test]
    fn active_warning_is_listed() {
        let state = LocationState {
            warning: WarningSensor {
                is_on: true,
                warning: vec![WarningSummary { title: "大风蓝色预警".into(), text: String::new() }],
            },
            ..LocationState::default()
        };
        let text = render_section(EndpointKind::Warning, &state);
        assert_eq!(text, "WARNING: 大风蓝色预警\n");
    }
}
