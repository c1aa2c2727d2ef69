use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CircuitBreaker, GatewayError, TableGateway};
use crate::config::{CircuitBreakerConfig, GatewayConfig};
use crate::models::{Reservation, Table, TablePatch};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client of the `/api/tables` endpoints.
#[derive(Clone)]
pub struct HttpTableGateway {
    base_url: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpTableGateway {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
            circuit_breaker,
        })
    }

    pub fn from_config(
        gateway: &GatewayConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, GatewayError> {
        let circuit_breaker = Arc::new(CircuitBreaker::new(
            breaker.failure_threshold,
            breaker.timeout_seconds,
        ));
        Self::new(
            &gateway.base_url,
            Duration::from_secs(gateway.timeout_seconds),
            circuit_breaker,
        )
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Runs one request through the circuit breaker. Transport errors and 5xx
    /// answers count as failures; 4xx answers mean the backend is healthy.
    async fn execute<T, F>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking table gateway request");
            return Err(GatewayError::Unavailable);
        }

        let result = operation.await;
        match &result {
            Err(GatewayError::Http(e)) => {
                warn!("Table gateway request failed: {:?}", e);
                self.circuit_breaker.record_failure();
            }
            Err(GatewayError::Status { status, .. }) if *status >= 500 => {
                self.circuit_breaker.record_failure();
            }
            _ => self.circuit_breaker.record_success(),
        }
        result
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    table_id: Option<i32>,
) -> Result<T, GatewayError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = table_id {
            return Err(GatewayError::NotFound(id));
        }
    }
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl TableGateway for HttpTableGateway {
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, GatewayError> {
        let url = format!("{}/api/tables", self.base_url);
        debug!("GET {} hall={:?}", url, hall_id);

        self.execute(async {
            let mut request = self.http_client.get(&url);
            if let Some(hall_id) = hall_id {
                request = request.query(&[("hall_id", hall_id)]);
            }
            let response = request.send().await?;
            read_json(response, None).await
        })
        .await
    }

    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Table, GatewayError> {
        let url = format!("{}/api/tables/{}", self.base_url, id);
        debug!("PATCH {} {:?}", url, patch);

        self.execute(async {
            let response = self.http_client.patch(&url).json(patch).send().await?;
            read_json(response, Some(id)).await
        })
        .await
    }

    async fn reservations(
        &self,
        table_id: i32,
        date: &str,
    ) -> Result<Vec<Reservation>, GatewayError> {
        let url = format!("{}/api/reservations", self.base_url);
        debug!("GET {} table={} date={}", url, table_id, date);

        self.execute(async {
            let table_id = table_id.to_string();
            let response = self
                .http_client
                .get(&url)
                .query(&[("table_id", table_id.as_str()), ("date", date)])
                .send()
                .await?;
            read_json(response, None).await
        })
        .await
    }
}
