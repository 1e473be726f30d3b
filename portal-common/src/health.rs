use serde::{Deserialize, Serialize};

/// Backend service whose health endpoint is polled
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub name: String,
    pub url: String,
}

impl ServiceEndpoint {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Outcome of one health check. Rebuilt on every poll cycle, never stored.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub healthy: bool,
}

impl ServiceStatus {
    pub fn of(endpoint: &ServiceEndpoint, healthy: bool) -> Self {
        Self {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            healthy,
        }
    }

    pub const fn label(&self) -> &'static str {
        if self.healthy {
            "Healthy"
        } else {
            "Unhealthy"
        }
    }
}
