use crate::metrics::MetricsError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const STATUS_SUCCESS: &str = "success";

/// An explicit `null` reads as the empty value, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response body of the instant query endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<QueryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<VectorSample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorSample {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric: BTreeMap<String, String>,
    /// `[timestamp, "sample"]`
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Vec<Value>,
}

impl QueryResponse {
    /// Reads the sample of the first series. `Ok(None)` when the backend has no data.
    pub fn first_sample(&self) -> Result<Option<f64>, MetricsError> {
        if self.status != STATUS_SUCCESS {
            return Err(MetricsError::Backend {
                error_type: self
                    .error_type
                    .clone()
                    .unwrap_or_else(|| self.status.clone()),
                error: self.error.clone().unwrap_or_default(),
            });
        }

        let sample = match self
            .data
            .as_ref()
            .and_then(|d| d.result.first())
            .and_then(|r| r.value.get(1))
        {
            None => return Ok(None),
            Some(sample) => sample,
        };

        let text = sample
            .as_str()
            .ok_or_else(|| MetricsError::UnexpectedSampleType(sample.to_string()))?;

        match text.parse::<f64>() {
            Ok(v) if !v.is_nan() => Ok(Some(v)),
            _ => Err(MetricsError::NonNumericSample {
                text: text.to_string(),
            }),
        }
    }
}
