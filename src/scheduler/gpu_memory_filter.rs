use crate::config::GpuMemoryFilterArgs;
use crate::errors::PluginError;
use crate::metrics::{GpuMemorySource, PrometheusClient};
use crate::scheduler::cycle_state::CycleState;
use crate::scheduler::node_info::NodeInfo;
use crate::scheduler::plugins::{Filter, Handle, Plugin, SchedulingContext, Status};
use crate::scheduler::policy::{ReasonCode, ThresholdPolicy, Verdict};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use log::{info, warn};
use std::sync::Arc;

pub const NAME: &str = "GpuMemoryFilter";

/// Rejects nodes whose gpu frame buffer usage does not satisfy the threshold policy.
/// Nodes with no usable sample are rejected too.
pub struct GpuMemoryFilter {
    source: Arc<dyn GpuMemorySource>,
    policy: ThresholdPolicy,
}

/// Plugin factory called by the host with the profile's plugin args.
pub fn new(
    _ctx: &SchedulingContext,
    config: Option<&serde_json::Value>,
    handle: Arc<dyn Handle>,
) -> Result<Box<dyn Filter>, PluginError> {
    let args =
        GpuMemoryFilterArgs::from_plugin_config(config).map_err(|e| PluginError::Config {
            plugin: NAME.to_string(),
            source: e,
        })?;
    let filter = GpuMemoryFilter::from_args(&args)?;
    info!(
        target: NAME,
        "profile {}: querying {} for {}{{{}}} {} {}",
        handle.profile_name(),
        args.prometheus_address,
        args.metric_name,
        args.node_label,
        args.comparison,
        args.threshold
    );
    Ok(Box::new(filter))
}

impl GpuMemoryFilter {
    pub fn with_source(source: Arc<dyn GpuMemorySource>, policy: ThresholdPolicy) -> Self {
        GpuMemoryFilter { source, policy }
    }

    pub fn from_args(args: &GpuMemoryFilterArgs) -> Result<Self, PluginError> {
        let client = PrometheusClient::new(
            &args.prometheus_address,
            &args.metric_name,
            &args.node_label,
            args.timeout(),
        )
        .map_err(|e| PluginError::Client {
            plugin: NAME.to_string(),
            source: e,
        })?;
        Ok(Self::with_source(Arc::new(client), args.policy()))
    }

    pub async fn evaluate(&self, ctx: &SchedulingContext, node_name: &str) -> Verdict {
        let fetched = ctx
            .run(self.source.fetch_gpu_memory_used(node_name))
            .await;
        let verdict = self.policy.decide(fetched);
        match &verdict {
            Verdict::Unknown(_) => warn!(target: NAME, "node {}: {}", node_name, verdict),
            _ => info!(
                target: NAME,
                "node {}: {} eligible={}",
                node_name,
                verdict,
                verdict.is_eligible()
            ),
        }
        verdict
    }

    pub async fn is_eligible(&self, ctx: &SchedulingContext, node_name: &str) -> bool {
        self.evaluate(ctx, node_name).await.is_eligible()
    }
}

impl Plugin for GpuMemoryFilter {
    fn name(&self) -> &str {
        NAME
    }
}

#[async_trait]
impl Filter for GpuMemoryFilter {
    async fn filter(
        &self,
        ctx: &SchedulingContext,
        _state: &CycleState,
        _pod: &Pod,
        node: &NodeInfo,
    ) -> Status {
        let node_name = node.name();
        if node_name.is_empty() {
            return Status::unschedulable(format!("{}: node has no name", ReasonCode::InvalidNode))
                .with_plugin(NAME);
        }

        let verdict = self.evaluate(ctx, node_name).await;
        if verdict.is_eligible() {
            return Status::success();
        }
        Status::unschedulable(format!("{} (node {})", verdict, node_name)).with_plugin(NAME)
    }
}
