use crate::metrics::envelope::QueryResponse;
use crate::metrics::query::{QueryError, gpu_memory_used_query, query_endpoint, query_url};
use crate::metrics::MetricsError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Url;
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Source of the gpu frame buffer usage of a node.
///
/// `Ok(None)` means the backend has no series for the node, which is not an error.
#[async_trait]
pub trait GpuMemorySource: Send + Sync {
    async fn fetch_gpu_memory_used(&self, node_name: &str) -> Result<Option<f64>, MetricsError>;
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct PrometheusClient {
    reqwest_client: reqwest::Client,
    endpoint: Url,
    metric_name: String,
    node_label: String,
}

impl PrometheusClient {
    /// Builds the client. Does no I/O; the backend is first contacted on fetch.
    pub fn new(
        address: &str,
        metric_name: &str,
        node_label: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let endpoint = query_endpoint(address)?;
        // validate names up front so a bad config fails at construction
        gpu_memory_used_query(metric_name, node_label, "")?;

        let reqwest_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(PrometheusClient {
            reqwest_client,
            endpoint,
            metric_name: metric_name.to_string(),
            node_label: node_label.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn url_for(&self, node_name: &str) -> Result<Url, QueryError> {
        let selector = gpu_memory_used_query(&self.metric_name, &self.node_label, node_name)?;
        Ok(query_url(&self.endpoint, &selector))
    }
}

#[async_trait]
impl GpuMemorySource for PrometheusClient {
    async fn fetch_gpu_memory_used(&self, node_name: &str) -> Result<Option<f64>, MetricsError> {
        // names were validated in new()
        let url = self.url_for(node_name).map_err(|e| MetricsError::Backend {
            error_type: "bad_query".to_string(),
            error: e.to_string(),
        })?;
        debug!(target: "metrics", "GET {}", url);

        let resp = self
            .reqwest_client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;

        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| MetricsError::Decode {
                status: status.as_u16(),
                source: e,
            })?;

        for warning in &parsed.warnings {
            warn!(target: "metrics", "backend warning for node {}: {}", node_name, warning);
        }

        if !status.is_success() && parsed.error.is_none() {
            return Err(MetricsError::Backend {
                error_type: format!("http_{}", status.as_u16()),
                error: status.to_string(),
            });
        }

        let sample = parsed.first_sample()?;
        debug!(target: "metrics", "node {} gpu memory used: {:?}", node_name, sample);
        Ok(sample)
    }
}

fn transport_error(e: reqwest::Error) -> MetricsError {
    if e.is_timeout() {
        return MetricsError::Timeout;
    }
    MetricsError::Unreachable(e)
}
