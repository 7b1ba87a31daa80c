pub mod client;
pub mod envelope;
pub mod query;

pub use client::{GpuMemorySource, PrometheusClient};

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("metrics backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("metrics query timed out")]
    Timeout,
    #[error("metrics query cancelled")]
    Cancelled,
    #[error("undecodable metrics response (http {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("metrics backend error ({error_type}): {error}")]
    Backend { error_type: String, error: String },
    #[error("sample is not a string: {0}")]
    UnexpectedSampleType(String),
    #[error("sample {text:?} is not numeric")]
    NonNumericSample { text: String },
}
