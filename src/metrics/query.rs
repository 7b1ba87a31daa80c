use reqwest::Url;
use std::fmt::{Display, Formatter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid metric name {0:?}")]
    InvalidMetricName(String),
    #[error("invalid label name {0:?}")]
    InvalidLabelName(String),
    #[error("invalid endpoint address {address:?}: {reason}")]
    InvalidEndpoint { address: String, reason: String },
}

/// An instant vector selector with exact-match label matchers, e.g.
/// `DCGM_FI_DEV_FB_USED{kubernetes_node="node-1"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    metric: String,
    matchers: Vec<(String, String)>,
}

impl Selector {
    pub fn new(metric: &str) -> Result<Self, QueryError> {
        if !is_valid_metric_name(metric) {
            return Err(QueryError::InvalidMetricName(metric.to_string()));
        }
        Ok(Selector {
            metric: metric.to_string(),
            matchers: vec![],
        })
    }

    pub fn with_label(mut self, name: &str, value: &str) -> Result<Self, QueryError> {
        if !is_valid_label_name(name) {
            return Err(QueryError::InvalidLabelName(name.to_string()));
        }
        self.matchers.push((name.to_string(), value.to_string()));
        Ok(self)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.metric)?;
        if self.matchers.is_empty() {
            return Ok(());
        }
        let matchers = self
            .matchers
            .iter()
            .map(|(name, value)| format!("{}={}", name, quote_label_value(value)))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{{{}}}", matchers)
    }
}

/// the selector for one node's gpu frame buffer usage
pub fn gpu_memory_used_query(
    metric: &str,
    node_label: &str,
    node_name: &str,
) -> Result<Selector, QueryError> {
    Selector::new(metric)?.with_label(node_label, node_name)
}

/// Resolves `<address>/api/v1/query`, keeping any path prefix on the address.
pub fn query_endpoint(address: &str) -> Result<Url, QueryError> {
    let invalid = |reason: String| QueryError::InvalidEndpoint {
        address: address.to_string(),
        reason,
    };

    let url = Url::parse(&format!("{}/api/v1/query", address.trim_end_matches('/')))
        .map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {}", other))),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("address must not carry a query or fragment".to_string()));
    }
    Ok(url)
}

/// Full GET url. The query text is form-encoded into the `query` parameter.
pub fn query_url(endpoint: &Url, selector: &Selector) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("query", &selector.to_string());
    url
}

// PromQL double quoted string literal
fn quote_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
