//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use route_core::RouteConfig;
use std::path::PathBuf;

/// Cloud backend holding the route tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Route tables kept in process memory
    Memory,
}

#[derive(Parser, Debug)]
#[command(
    name = "route-controller",
    about = "Keeps VPC route tables in sync with node pod CIDRs"
)]
pub struct Args {
    /// YAML configuration file; flags and env vars override its values
    #[arg(long, env = "ROUTE_CONTROLLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated route table ids
    #[arg(long, env = "ROUTE_TABLE_IDS")]
    pub route_table_ids: Option<String>,

    /// Only manage routes inside this CIDR
    #[arg(long, env = "CLUSTER_CIDR")]
    pub cluster_cidr: Option<String>,

    /// Create routes for node pod CIDRs
    #[arg(long, env = "CONFIGURE_CLOUD_ROUTES")]
    pub configure_cloud_routes: Option<bool>,

    /// VPC id of the cluster
    #[arg(long, env = "VPC_ID")]
    pub vpc_id: Option<String>,

    #[arg(long, value_enum, default_value_t = ProviderKind::Memory)]
    pub provider: ProviderKind,

    /// Emit JSON logs
    #[arg(long, env = "ROUTE_CONTROLLER_LOG_JSON")]
    pub log_json: bool,

    /// Run a single reconciliation and exit
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Load the config file, if any, and apply overrides
    pub fn load_config(&self) -> anyhow::Result<RouteConfig> {
        let mut config = match &self.config {
            Some(path) => RouteConfig::load(path)?,
            None => RouteConfig::default(),
        };

        if let Some(ids) = &self.route_table_ids {
            config.route_table_ids = Some(ids.clone());
        }
        if let Some(cidr) = &self.cluster_cidr {
            config.cluster_cidr = Some(cidr.clone());
        }
        if let Some(enabled) = self.configure_cloud_routes {
            config.configure_routes = enabled;
        }
        if let Some(vpc_id) = &self.vpc_id {
            config.vpc_id = Some(vpc_id.clone());
        }
        Ok(config)
    }
}
