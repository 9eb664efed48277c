//! HTTP adapter for the delivery service.

use std::env;

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, TransportError};
use crate::model::DeliveryCandidate;
use crate::session::DateRange;
use crate::traits::DeliveryBackend;
use crate::wire::ApiEnvelope;

pub const CANDIDATES_PATH: &str = "/pedidos/entregar";
pub const ROUTES_PATH: &str = "/pedidos/rutas";

const BASE_URL_VAR: &str = "ROUTE_PLANNER_API_URL";
const TIMEOUT_VAR: &str = "ROUTE_PLANNER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `ROUTE_PLANNER_API_URL` and
    /// `ROUTE_PLANNER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            config.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: TIMEOUT_VAR,
                value: timeout.clone(),
            })?;
        }

        Ok(config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryApiClient {
    config: ApiConfig,
    client: reqwest::blocking::Client,
}

impl DeliveryApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl DeliveryBackend for DeliveryApiClient {
    fn fetch_candidates(&self, range: &DateRange) -> Result<Vec<Value>, TransportError> {
        let url = format!(
            "{}?fechaInicio={}&fechaFin={}",
            self.config.url(CANDIDATES_PATH),
            range.start_param(),
            range.end_param()
        );
        debug!(%url, "fetching delivery candidates");

        let response = self.client.get(url).send()?;
        read_batch(response)
    }

    fn generate_routes(&self, selection: &[DeliveryCandidate]) -> Result<Vec<Value>, TransportError> {
        let url = self.config.url(ROUTES_PATH);
        debug!(%url, orders = selection.len(), "requesting routes");

        let response = self.client.post(url).json(selection).send()?;
        read_batch(response)
    }
}

fn read_batch(response: reqwest::blocking::Response) -> Result<Vec<Value>, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let envelope = response.json::<ApiEnvelope>()?;
    envelope.into_batch()
}
