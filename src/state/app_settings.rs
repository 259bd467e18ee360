use ftc_api::DEFAULT_SEASON;
use ftc_api::aggregate::{Aggregator, DEFAULT_MATCH_CONCURRENCY};
use ftc_api::client::FtcScoutApi;
use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// GraphQL endpoint override; `None` uses the public FTCScout API.
    pub api_url: Option<String>,
    pub season: u16,
    pub match_concurrency: usize,
    pub timeout: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: None,
            season: DEFAULT_SEASON,
            match_concurrency: DEFAULT_MATCH_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppSettings {
    /// Read `FTCTUI_*` environment variables. Unparseable values fall back to
    /// defaults.
    pub fn load() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        Self {
            full_screen: false,
            log_level: get("FTCTUI_LOG").and_then(|v| LevelFilter::from_str(&v).ok()),
            api_url: get("FTCTUI_API_URL"),
            season: get("FTCTUI_SEASON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.season),
            match_concurrency: get("FTCTUI_MATCH_CONCURRENCY")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.max(1))
                .unwrap_or(defaults.match_concurrency),
            timeout: get("FTCTUI_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn aggregator(&self) -> Aggregator {
        let mut api = FtcScoutApi::new().with_timeout(self.timeout);
        if let Some(url) = &self.api_url {
            api = api.with_endpoint(url.clone());
        }
        Aggregator::new(api, self.season).with_concurrency(self.match_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let s = settings(&[]);
        assert_eq!(s.season, DEFAULT_SEASON);
        assert_eq!(s.match_concurrency, DEFAULT_MATCH_CONCURRENCY);
        assert_eq!(s.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(s.api_url.is_none());
        assert!(s.log_level.is_none());
    }

    #[test]
    fn env_overrides_are_applied() {
        let s = settings(&[
            ("FTCTUI_SEASON", "2023"),
            ("FTCTUI_API_URL", "http://localhost:4000/graphql"),
            ("FTCTUI_MATCH_CONCURRENCY", "0"),
            ("FTCTUI_TIMEOUT_SECS", "3"),
            ("FTCTUI_LOG", "debug"),
        ]);
        assert_eq!(s.season, 2023);
        assert_eq!(s.api_url.as_deref(), Some("http://localhost:4000/graphql"));
        assert_eq!(s.match_concurrency, 1);
        assert_eq!(s.timeout, Duration::from_secs(3));
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn garbage_values_fall_back() {
        let s = settings(&[
            ("FTCTUI_SEASON", "next year"),
            ("FTCTUI_TIMEOUT_SECS", "0"),
            ("FTCTUI_LOG", "loud"),
            ("FTCTUI_API_URL", "   "),
        ]);
        assert_eq!(s.season, DEFAULT_SEASON);
        assert_eq!(s.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(s.log_level.is_none());
        assert!(s.api_url.is_none());
    }

    #[test]
    fn aggregator_uses_configured_season() {
        let s = settings(&[("FTCTUI_SEASON", "2022")]);
        assert_eq!(s.aggregator().season(), 2022);
    }
}
