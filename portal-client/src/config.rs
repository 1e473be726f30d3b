//! Client configuration. Defaults describe the standard deployment behind the edge service; the
//! API base can be overridden at build time through `PORTAL_API_BASE` and any value at runtime
//! through a JSON document embedded in the page.

use std::time::Duration;

use common::error::RpResult;
use recruit_portal_common::ServiceEndpoint;
use serde::Deserialize;

/// Base URL prepended to every relative API path, unless overridden at runtime
const DEFAULT_API_BASE: &str = match option_env!("PORTAL_API_BASE") {
    Some(base) => base,
    None => "",
};

/// Shortest accepted pause between two health poll cycles
const MIN_HEALTH_INTERVAL_SECS: u64 = 1;

/// Storage keys used for the persisted browser state
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageKeys {
    pub token: String,
    pub user: String,
    /// Token key written by older page scripts, migrated to [StorageKeys::token] on load
    pub legacy_token: String,
    /// User key written by older page scripts, migrated to [StorageKeys::user] on load
    pub legacy_user: String,
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "authToken".to_owned(),
            user: "currentUser".to_owned(),
            legacy_token: "access_token".to_owned(),
            legacy_user: "user".to_owned(),
            theme: "theme".to_owned(),
        }
    }
}

/// Runtime configuration of the portal client
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub health_services: Vec<ServiceEndpoint>,
    pub health_interval_secs: u64,
    pub alert_dismiss_secs: u64,
    pub dashboard_page: String,
    pub login_page: String,
    pub login_redirect_delay_ms: u64,
    pub registration_redirect_delay_ms: u64,
    pub storage: StorageKeys,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            health_services: vec![
                ServiceEndpoint::new("Edge Service", "/health"),
                ServiceEndpoint::new("Auth Service", "/auth/health"),
                ServiceEndpoint::new("Registration Service", "/registration/health"),
                ServiceEndpoint::new("Job Application Service", "/jobapplications/health"),
            ],
            health_interval_secs: 30,
            alert_dismiss_secs: 5,
            dashboard_page: "/dashboard".to_owned(),
            login_page: "/login".to_owned(),
            login_redirect_delay_ms: 1000,
            registration_redirect_delay_ms: 2000,
            storage: StorageKeys::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl ClientConfig {
    /// Parse a configuration document. Missing fields keep their default value and the health
    /// interval is raised to at least one second.
    /// # Errors
    /// This function will return an error if the `json` is not a valid configuration object
    pub fn from_json(json: &str) -> RpResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.health_interval_secs < MIN_HEALTH_INTERVAL_SECS {
            log::warn!(
                "Health interval of {}s is too short, using {MIN_HEALTH_INTERVAL_SECS}s",
                config.health_interval_secs
            );
            config.health_interval_secs = MIN_HEALTH_INTERVAL_SECS;
        }
        Ok(config)
    }

    /// Resolve a backend `path` against the API base. Absolute URLs are returned untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = self.api_base.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Health endpoints with their URLs resolved against the API base
    pub fn resolved_health_services(&self) -> Vec<ServiceEndpoint> {
        self.health_services
            .iter()
            .map(|service| ServiceEndpoint::new(service.name.clone(), self.url(&service.url)))
            .collect()
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(MIN_HEALTH_INTERVAL_SECS))
    }

    pub const fn alert_dismiss_after(&self) -> Duration {
        Duration::from_secs(self.alert_dismiss_secs)
    }

    pub const fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub const fn registration_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.registration_redirect_delay_ms)
    }

    /// Configured log level, falling back to [log::Level::Info] for unknown values
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
