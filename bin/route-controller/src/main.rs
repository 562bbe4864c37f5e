use anyhow::Result;
use clap::Parser;
use route_core::{MemoryVpc, Reconciler, RouteMetrics, VpcProvider};
use route_kube::KubeClusterState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod route_controller;

use args::{Args, ProviderKind};
use route_controller::RouteController;

const CONTROLLER_NAME: &str = "route-controller";
const DEFAULT_VPC_ID: &str = "vpc-local";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("Starting route-controller...");

    let config = args.load_config()?;
    let provider = build_provider(args.provider, &config).await;
    let cluster = Arc::new(KubeClusterState::try_default(CONTROLLER_NAME).await?);
    let reconciler = Reconciler::new(provider, cluster, &config, RouteMetrics::new()?)?;

    let controller = RouteController::new(reconciler, config.sync_period());
    if args.once {
        controller.sync_once().await;
        return Ok(());
    }
    controller.run().await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_provider(kind: ProviderKind, config: &route_core::RouteConfig) -> Arc<dyn VpcProvider> {
    match kind {
        ProviderKind::Memory => {
            let vpc_id = config.vpc_id.as_deref().unwrap_or(DEFAULT_VPC_ID);
            let vpc = MemoryVpc::new(vpc_id);
            match config.route_table_ids.as_deref().filter(|ids| !ids.is_empty()) {
                Some(ids) => {
                    for table in ids.split(',') {
                        vpc.add_table(table).await;
                    }
                }
                None => vpc.add_table(&format!("rtb-{}", vpc_id)).await,
            }
            info!(vpc_id, "Using in-memory route tables");
            Arc::new(vpc)
        }
    }
}
