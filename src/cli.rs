use crate::config::GpuMemoryFilterArgs;
use crate::metrics::PrometheusClient;
use crate::scheduler::cycle_state::CycleState;
use crate::scheduler::node_info::NodeInfo;
use crate::scheduler::{FilterFramework, GpuMemoryFilter, NodeSelection, SchedulingContext};
use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;
use std::error::Error;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;
use validator::Validate;

#[derive(Debug, Parser)]
#[command(name = "gpu-memory-filter")]
#[command(about = "Check node eligibility against gpu memory usage", long_about = None, arg_required_else_help = true, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(long_about = "Run the filter against one or more nodes")]
    Check(CheckArgs),
    #[command(long_about = "Print the metrics query url for a node without sending it")]
    Query(QueryArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConfigFileArgs {
    #[arg(long, long_help = "Plugin args file (yaml).")]
    pub config: Option<String>,
    #[arg(long, env = "GPU_MEMORY_FILTER_PROMETHEUS_ADDRESS", long_help = "Address of the metrics backend.")]
    pub prometheus_address: Option<String>,
    #[arg(long, long_help = "GPU memory limit, in the unit of the metric.")]
    pub threshold: Option<f64>,
    #[arg(long, long_help = "Backend request timeout in seconds.")]
    pub timeout_seconds: Option<u64>,
}

impl ConfigFileArgs {
    pub fn resolve(&self) -> Result<GpuMemoryFilterArgs, Box<dyn Error>> {
        let mut args = match &self.config {
            Some(path) => GpuMemoryFilterArgs::load(path)?,
            None => GpuMemoryFilterArgs::default(),
        };
        if let Some(address) = &self.prometheus_address {
            args.prometheus_address = address.clone();
        }
        if let Some(threshold) = self.threshold {
            args.threshold = threshold;
        }
        if let Some(timeout) = self.timeout_seconds {
            args.timeout_seconds = timeout;
        }
        args.validate()?;
        Ok(args)
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    config: ConfigFileArgs,
    #[arg(long, long_help = "Print results as json.")]
    json: bool,
    #[arg(required = true)]
    nodes: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    config: ConfigFileArgs,
    node: String,
}

#[derive(Tabled, Serialize, Debug, PartialEq)]
#[tabled(rename_all = "UPPERCASE")]
pub struct CheckListItem {
    pub node: String,
    pub result: String,
    pub reason: String,
}

pub fn check_list_items(nodes: &[String], selection: &NodeSelection) -> Vec<CheckListItem> {
    nodes
        .iter()
        .map(|name| {
            match selection.rejected.iter().find(|r| &r.node_name == name) {
                Some(rejected) => CheckListItem {
                    node: name.clone(),
                    result: "REJECT".to_string(),
                    reason: rejected.reason.clone(),
                },
                None => CheckListItem {
                    node: name.clone(),
                    result: "PASS".to_string(),
                    reason: "-".to_string(),
                },
            }
        })
        .collect()
}

async fn check(args: CheckArgs) -> Result<(), Box<dyn Error>> {
    if args.nodes.iter().any(|n| n.is_empty()) {
        return Err(anyhow!("node names must not be empty").into());
    }
    let plugin_args = args.config.resolve()?;
    let filter = GpuMemoryFilter::from_args(&plugin_args)?;
    let framework = FilterFramework::new(vec![Box::new(filter)]);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ctx = SchedulingContext::new(cancel);
    let nodes: Vec<_> = args.nodes.iter().map(|n| NodeInfo::from_name(n)).collect();
    let selection = framework
        .filter_nodes(&ctx, &CycleState::new(), &Pod::default(), &nodes)
        .await;

    let items = check_list_items(&args.nodes, &selection);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    let mut table = Table::new(items);
    table.with(Style::empty());
    println!("{}", table);
    Ok(())
}

fn query(args: QueryArgs) -> Result<(), Box<dyn Error>> {
    let plugin_args = args.config.resolve()?;
    let client = PrometheusClient::new(
        &plugin_args.prometheus_address,
        &plugin_args.metric_name,
        &plugin_args.node_label,
        plugin_args.timeout(),
    )?;
    println!("{}", client.url_for(&args.node)?);
    Ok(())
}

pub async fn cli() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    match args.command {
        Commands::Check(args) => check(args).await,
        Commands::Query(args) => query(args),
    }
}
