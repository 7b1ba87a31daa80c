use crate::metrics::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum_macros::Display as StrumDisplay;

pub const DEFAULT_THRESHOLD: f64 = 22000.0;

/// How a sample is compared against the limit. A node is eligible when
/// `used <comparison> limit` holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    #[default]
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    pub limit: f64,
    pub comparison: Comparison,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy {
            limit: DEFAULT_THRESHOLD,
            comparison: Comparison::Lt,
        }
    }
}

impl ThresholdPolicy {
    pub fn new(limit: f64, comparison: Comparison) -> Self {
        ThresholdPolicy { limit, comparison }
    }

    pub fn admits(&self, used: f64) -> bool {
        match self.comparison {
            Comparison::Lt => used < self.limit,
            Comparison::Le => used <= self.limit,
            Comparison::Gt => used > self.limit,
            Comparison::Ge => used >= self.limit,
        }
    }

    /// Turns the outcome of a metrics fetch into a verdict. Errors never admit.
    pub fn decide(&self, fetched: Result<Option<f64>, MetricsError>) -> Verdict {
        match fetched {
            Err(e) => Verdict::Unknown(UnknownCause::Metrics(e)),
            Ok(None) => Verdict::Unknown(UnknownCause::NoData),
            Ok(Some(used)) if self.admits(used) => Verdict::Eligible { used },
            Ok(Some(used)) => Verdict::Rejected {
                used,
                limit: self.limit,
                comparison: self.comparison,
            },
        }
    }
}

#[derive(Debug)]
pub enum UnknownCause {
    NoData,
    Metrics(MetricsError),
}

#[derive(Debug)]
pub enum Verdict {
    Eligible {
        used: f64,
    },
    Rejected {
        used: f64,
        limit: f64,
        comparison: Comparison,
    },
    Unknown(UnknownCause),
}

/// Stable prefix of an unschedulable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum ReasonCode {
    Overcommitted,
    NoMetrics,
    MetricsUnavailable,
    InvalidNode,
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible { .. })
    }

    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            Verdict::Eligible { .. } => None,
            Verdict::Rejected { .. } => Some(ReasonCode::Overcommitted),
            Verdict::Unknown(UnknownCause::NoData) => Some(ReasonCode::NoMetrics),
            Verdict::Unknown(UnknownCause::Metrics(_)) => Some(ReasonCode::MetricsUnavailable),
        }
    }

    pub fn used(&self) -> Option<f64> {
        match self {
            Verdict::Eligible { used } | Verdict::Rejected { used, .. } => Some(*used),
            Verdict::Unknown(_) => None,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Eligible { used } => write!(f, "gpu memory used {}", used),
            Verdict::Rejected {
                used,
                limit,
                comparison,
            } => write!(
                f,
                "{}: gpu memory used {} does not satisfy {} {}",
                ReasonCode::Overcommitted,
                used,
                comparison,
                limit
            ),
            Verdict::Unknown(UnknownCause::NoData) => {
                write!(f, "{}: no gpu memory samples for node", ReasonCode::NoMetrics)
            }
            Verdict::Unknown(UnknownCause::Metrics(e)) => {
                write!(f, "{}: {}", ReasonCode::MetricsUnavailable, e)
            }
        }
    }
}
