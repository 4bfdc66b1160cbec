//! HB-01: Hub API client.
//!
//! Thin typed wrapper over the Hub's JSON endpoints. Blocking reqwest,
//! called from async commands via `spawn_blocking`. No retries here:
//! the store decides what a failed fetch means for cached state.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::license::LicenseStub;
use crate::models::module::{AreaStub, CatalogEntry};

/// Typed failures from Hub API calls. Connection and timeout are
/// distinguished so the frontend can phrase "backend down" apart from
/// "backend slow"; everything else carries the failing path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Cannot reach Hub API at {0}")]
    Connection(String),
    #[error("Hub API request to {path} timed out after {secs}s")]
    Timeout { path: String, secs: u64 },
    #[error("Hub API returned {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("Invalid response from {path}: {detail}")]
    Decode { path: String, detail: String },
    #[error("Hub API request failed: {0}")]
    Transport(String),
}

/// Response body from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Seam between the store and the HTTP layer. Lets tests swap the
/// network for canned payloads.
pub trait HubApi: Send + Sync {
    fn fetch_areas(&self) -> Result<Vec<AreaStub>, CatalogError>;
    fn fetch_licenses(&self) -> Result<Vec<LicenseStub>, CatalogError>;
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
    fn health(&self) -> Result<HealthReport, CatalogError>;
}

/// Blocking HTTP client for the Hub API.
pub struct HubClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HubClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client for the configured Hub instance (env override or the
    /// local backend).
    pub fn from_config() -> Self {
        Self::new(&config::api_base_url(), config::API_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                CatalogError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                CatalogError::Timeout {
                    path: path.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                CatalogError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().map_err(|e| CatalogError::Decode {
            path: path.to_string(),
            detail: e.to_string(),
        })
    }
}

impl HubApi for HubClient {
    fn fetch_areas(&self) -> Result<Vec<AreaStub>, CatalogError> {
        self.get_json("/modules/areas")
    }

    fn fetch_licenses(&self) -> Result<Vec<LicenseStub>, CatalogError> {
        self.get_json("/licenses")
    }

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.get_json("/modules/catalog")
    }

    fn health(&self) -> Result<HealthReport, CatalogError> {
        self.get_json("/health")
    }
}

/// Mock Hub API for tests. Every endpoint returns a canned payload
/// or the configured error.
pub struct MockHubApi {
    areas: Result<Vec<AreaStub>, CatalogError>,
    licenses: Result<Vec<LicenseStub>, CatalogError>,
    catalog: Result<Vec<CatalogEntry>, CatalogError>,
    healthy: bool,
}

impl MockHubApi {
    pub fn new() -> Self {
        Self {
            areas: Ok(Vec::new()),
            licenses: Ok(Vec::new()),
            catalog: Ok(Vec::new()),
            healthy: true,
        }
    }

    pub fn with_areas(mut self, areas: Vec<AreaStub>) -> Self {
        self.areas = Ok(areas);
        self
    }

    pub fn with_licenses(mut self, licenses: Vec<LicenseStub>) -> Self {
        self.licenses = Ok(licenses);
        self
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogEntry>) -> Self {
        self.catalog = Ok(catalog);
        self
    }

    /// Every endpoint fails with the given error.
    pub fn failing(error: CatalogError) -> Self {
        Self {
            areas: Err(error.clone()),
            licenses: Err(error.clone()),
            catalog: Err(error),
            healthy: false,
        }
    }
}

impl Default for MockHubApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HubApi for MockHubApi {
    fn fetch_areas(&self) -> Result<Vec<AreaStub>, CatalogError> {
        self.areas.clone()
    }

    fn fetch_licenses(&self) -> Result<Vec<LicenseStub>, CatalogError> {
        self.licenses.clone()
    }

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.catalog.clone()
    }

    fn health(&self) -> Result<HealthReport, CatalogError> {
        if self.healthy {
            Ok(HealthReport {
                status: "ok".to_string(),
            })
        } else {
            Err(CatalogError::Connection("mock".to_string()))
        }
    }
}
