use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Mutex};

use super::endpoint::EndpointKind;

/// When requests may resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockedUntil {
    #[default]
    Open,
    Until(DateTime<Utc>),
    /// Never retried for the lifetime of the process.
    Forever,
}

impl BlockedUntil {
    pub fn is_blocked_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            BlockedUntil::Open => false,
            BlockedUntil::Until(until) => now < *until,
            BlockedUntil::Forever => true,
        }
    }
}

/// Whether a cooldown applies to the whole client or only to the endpoint that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownScope {
    /// One exhausted key throttles every endpoint of the location.
    #[default]
    Client,
    Endpoint,
}

/// Cooldown state shared by the fetchers of one client.
///
/// Created by the caller and handed to [`QWeatherClient`](super::QWeatherClient), so the
/// sharing between fetchers is explicit. The lock is only held to read or write a single
/// value and never across an await point.
#[derive(Debug, Default)]
pub struct Cooldown {
    scope: CooldownScope,
    blocked: Mutex<HashMap<Option<EndpointKind>, BlockedUntil>>,
}

impl Cooldown {
    pub fn new(scope: CooldownScope) -> Self {
        Self { scope, blocked: Mutex::new(HashMap::new()) }
    }

    pub fn scope(&self) -> CooldownScope {
        self.scope
    }

    fn key(&self, endpoint: EndpointKind) -> Option<EndpointKind> {
        match self.scope {
            CooldownScope::Client => None,
            CooldownScope::Endpoint => Some(endpoint),
        }
    }

    pub fn blocked_until(&self, endpoint: EndpointKind) -> BlockedUntil {
        let blocked = self.blocked.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        blocked.get(&self.key(endpoint)).copied().unwrap_or_default()
    }

    /// The request gate: may `endpoint` be requested at `now`?
    pub fn admits(&self, endpoint: EndpointKind, now: DateTime<Utc>) -> bool {
        !self.blocked_until(endpoint).is_blocked_at(now)
    }

    pub fn block(&self, endpoint: EndpointKind, until: BlockedUntil) {
        let key = self.key(endpoint);
        let mut blocked = self.blocked.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        blocked.insert(key, until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn fresh_cooldown_admits_everything() {
        let cooldown = Cooldown::default();
        for kind in EndpointKind::all() {
            assert!(cooldown.admits(*kind, t0()));
            assert_eq!(cooldown.blocked_until(*kind), BlockedUntil::Open);
        }
    }

    #[test]
    fn until_expires_at_the_boundary() {
        let until = BlockedUntil::Until(t0() + Duration::seconds(60));
        assert!(until.is_blocked_at(t0()));
        assert!(until.is_blocked_at(t0() + Duration::seconds(59)));
        assert!(!until.is_blocked_at(t0() + Duration::seconds(60)));
    }

    #[test]
    fn client_scope_blocks_every_endpoint() {
        let cooldown = Cooldown::new(CooldownScope::Client);
        cooldown.block(EndpointKind::AirQuality, BlockedUntil::Forever);

        assert!(!cooldown.admits(EndpointKind::AirQuality, t0()));
        assert!(!cooldown.admits(EndpointKind::Warning, t0()));
    }

    #[test]
    fn endpoint_scope_blocks_only_the_failing_endpoint() {
        let cooldown = Cooldown::new(CooldownScope::Endpoint);
        cooldown.block(EndpointKind::AirQuality, BlockedUntil::Forever);

        assert!(!cooldown.admits(EndpointKind::AirQuality, t0()));
        assert!(cooldown.admits(EndpointKind::Warning, t0()));
    }

    #[test]
    fn scope_deserializes_from_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            scope: CooldownScope,
        }
        let w: Wrapper = toml::from_str(r#"scope = "endpoint""#).unwrap();
        assert_eq!(w.scope, CooldownScope::Endpoint);
    }
}
