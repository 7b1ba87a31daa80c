use crate::scheduler::cycle_state::CycleState;
use crate::scheduler::node_info::NodeInfo;
use crate::scheduler::plugins::{Filter, SchedulingContext, Status};
use futures::future::join_all;
use itertools::{Either, Itertools};
use k8s_openapi::api::core::v1::Pod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedNode {
    pub node_name: String,
    pub plugin: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodeSelection {
    pub feasible: Vec<NodeInfo>,
    pub rejected: Vec<RejectedNode>,
}

/// Runs the filter extension point for one pod over a set of candidate nodes.
pub struct FilterFramework {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterFramework {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Filters run in order per node and stop at the first rejection.
    pub async fn run_filter_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        pod: &Pod,
        node: &NodeInfo,
    ) -> Status {
        for filter in &self.filters {
            let status = filter.filter(ctx, state, pod, node).await;
            if !status.is_success() {
                return status;
            }
        }
        Status::success()
    }

    /// Nodes are evaluated concurrently; the result keeps the input order.
    pub async fn filter_nodes(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        pod: &Pod,
        nodes: &[NodeInfo],
    ) -> NodeSelection {
        let statuses = join_all(
            nodes
                .iter()
                .map(|node| self.run_filter_plugins(ctx, state, pod, node)),
        )
        .await;

        let (feasible, rejected): (Vec<_>, Vec<_>) =
            nodes.iter().zip(statuses).partition_map(|(node, status)| {
                if status.is_success() {
                    return Either::Left(node.clone());
                }
                Either::Right(RejectedNode {
                    node_name: node.name().to_string(),
                    reason: status.message(),
                    plugin: status.plugin,
                })
            });

        NodeSelection { feasible, rejected }
    }
}
