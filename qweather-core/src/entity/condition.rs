use serde::{Deserialize, Serialize};

/// Weather conditions understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    ClearNight,
    Cloudy,
    Exceptional,
    Fog,
    Hail,
    LightningRainy,
    Partlycloudy,
    Pouring,
    Rainy,
    Snowy,
    SnowyRainy,
    Sunny,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::ClearNight => "clear-night",
            Condition::Cloudy => "cloudy",
            Condition::Exceptional => "exceptional",
            Condition::Fog => "fog",
            Condition::Hail => "hail",
            Condition::LightningRainy => "lightning-rainy",
            Condition::Partlycloudy => "partlycloudy",
            Condition::Pouring => "pouring",
            Condition::Rainy => "rainy",
            Condition::Snowy => "snowy",
            Condition::SnowyRainy => "snowy-rainy",
            Condition::Sunny => "sunny",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a QWeather icon code to a host condition.
///
/// See <https://dev.qweather.com/docs/resource/icons/>.
pub fn condition_for_icon(icon: &str) -> Option<Condition> {
    use Condition::*;

    let condition = match icon {
        "100" => Sunny,
        "101" => Cloudy,
        "102" | "103" => Partlycloudy,
        "104" => Cloudy,
        "150" => ClearNight,
        "151" => Cloudy,
        "152" | "153" => Partlycloudy,
        "300" => Rainy,
        "301" => Pouring,
        "302" | "303" => LightningRainy,
        "304" => Hail,
        "305" | "306" => Rainy,
        "307" | "308" => Pouring,
        "309" => Rainy,
        "310" | "311" | "312" => Pouring,
        "313" | "314" | "315" => Rainy,
        "316" | "317" | "318" => Pouring,
        "350" => Rainy,
        "351" => Pouring,
        "399" => Rainy,
        "400" | "401" | "402" | "403" => Snowy,
        "404" | "405" | "406" => SnowyRainy,
        "407" | "408" | "409" | "410" => Snowy,
        "456" => SnowyRainy,
        "457" | "499" => Snowy,
        "500" | "501" | "502" => Fog,
        "503" | "504" | "507" | "508" => Exceptional,
        "509" | "510" | "511" | "512" | "513" | "514" | "515" => Fog,
        "900" | "901" | "999" => Exceptional,
        _ => return None,
    };
    Some(condition)
}
