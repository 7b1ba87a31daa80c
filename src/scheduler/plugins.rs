use crate::metrics::MetricsError;
use crate::scheduler::cycle_state::CycleState;
use crate::scheduler::node_info::NodeInfo;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use std::future::Future;
use strum_macros::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

//*
// NOTE: the plugin contract mirrors the Kubernetes scheduler framework.

// Copyright 2019 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// */

pub trait Plugin {
    fn name(&self) -> &str;
}

/// Services the host scheduler hands to plugins at construction.
pub trait Handle: Send + Sync {
    fn profile_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Code {
    Success,
    Unschedulable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: Code,
    pub reasons: Vec<String>,
    pub plugin: Option<String>,
}

impl Status {
    pub fn success() -> Self {
        Status {
            code: Code::Success,
            reasons: vec![],
            plugin: None,
        }
    }

    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Status {
            code: Code::Unschedulable,
            reasons: vec![reason.into()],
            plugin: None,
        }
    }

    pub fn with_plugin(mut self, plugin: &str) -> Self {
        self.plugin = Some(plugin.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }

    pub fn message(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Per-invocation cancellation and deadline passed in by the host.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl SchedulingContext {
    pub fn new(cancel: CancellationToken) -> Self {
        SchedulingContext {
            cancel,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Races `fut` against cancellation and the deadline.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, MetricsError>
    where
        F: Future<Output = Result<T, MetricsError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(MetricsError::Cancelled);
        }
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .unwrap_or(Err(MetricsError::Timeout)),
                None => fut.await,
            }
        };
        tokio::select! {
            _ = self.cancel.cancelled() => Err(MetricsError::Cancelled),
            res = bounded => res,
        }
    }
}

/// These plugins are used to filter out nodes that cannot run the Pod. For each node, the scheduler
/// will call filter plugins in their configured order. If any filter plugin marks the node as
/// infeasible, the remaining plugins will not be called for that node.
#[async_trait]
pub trait Filter: Plugin + Send + Sync {
    async fn filter(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        pod: &Pod,
        node: &NodeInfo,
    ) -> Status;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn should_pass_through_when_not_cancelled() {
        let ctx = SchedulingContext::default();
        let res = ctx.run(async { Ok::<_, MetricsError>(42) }).await;
        assert_eq!(res.unwrap(), 42);
    }

    #[tokio::test]
    async fn should_stop_on_cancel() {
        let token = CancellationToken::new();
        let ctx = SchedulingContext::new(token.clone());
        token.cancel();
        let res = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, MetricsError>(())
            })
            .await;
        assert!(matches!(res, Err(MetricsError::Cancelled)));
    }

    #[tokio::test]
    async fn should_stop_at_deadline() {
        let ctx = SchedulingContext::default()
            .with_deadline(Instant::now() + Duration::from_millis(20));
        let res = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, MetricsError>(())
            })
            .await;
        assert!(matches!(res, Err(MetricsError::Timeout)));
    }

    #[test]
    fn status_message_joins_reasons() {
        let status = Status::unschedulable("a").with_plugin("p");
        assert!(!status.is_success());
        assert_eq!(status.code.to_string(), "Unschedulable");
        assert_eq!(status.message(), "a");
        assert_eq!(status.plugin.as_deref(), Some("p"));
        assert!(Status::success().is_success());
    }
}
