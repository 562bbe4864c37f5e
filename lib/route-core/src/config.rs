//! Route controller configuration

use crate::backoff::BackoffPolicy;
use crate::cidr::parse_scope;
use crate::lookup::LookupStrategy;
use crate::{Result, RouteError};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the route controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    /// Comma-separated route table ids; skips table discovery when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table_ids: Option<String>,

    /// Only routes inside this network are managed (all routes when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,

    /// Create routes for nodes
    pub configure_routes: bool,

    /// VPC id for providers that cannot discover it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,

    /// Backoff applied to route creation
    pub backoff: BackoffPolicy,

    /// Where to look for existing routes before creating
    pub lookup: LookupStrategy,

    /// Seconds between reconciliation passes
    pub sync_period_seconds: u64,

    /// Upper bound (seconds) for one operation: listing a table, one delete,
    /// one node's lookup and create with backoff, or one node status update
    pub call_timeout_seconds: u64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            route_table_ids: None,
            cluster_cidr: None,
            configure_routes: true,
            vpc_id: None,
            backoff: BackoffPolicy::default(),
            lookup: LookupStrategy::default(),
            sync_period_seconds: 300,
            call_timeout_seconds: 120,
        }
    }
}

impl RouteConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RouteError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| RouteError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Parsed cluster scope network
    pub fn cluster_scope(&self) -> Result<Option<Ipv4Network>> {
        parse_scope(self.cluster_cidr.as_deref())
            .map_err(|e| RouteError::Config(format!("error parse cluster cidr: {}", e)))
    }

    pub fn sync_period(&self) -> Duration {
        Duration::from_secs(self.sync_period_seconds)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouteConfig::default();
        assert!(config.configure_routes);
        assert_eq!(config.backoff, BackoffPolicy::default());
        assert_eq!(config.lookup, LookupStrategy::Listed);
        assert_eq!(config.sync_period(), Duration::from_secs(300));
        assert_eq!(config.call_timeout(), Duration::from_secs(120));
        assert_eq!(config.cluster_scope().unwrap(), None);
    }

    #[test]
    fn test_from_yaml() {
        let config = RouteConfig::from_yaml(
            r#"
routeTableIds: "rt-1,rt-2"
clusterCidr: 172.16.0.0/12
configureRoutes: false
lookup: provider
callTimeoutSeconds: 30
backoff:
  initialMs: 500
"#,
        )
        .unwrap();

        assert_eq!(config.route_table_ids.as_deref(), Some("rt-1,rt-2"));
        assert!(!config.configure_routes);
        assert_eq!(config.lookup, LookupStrategy::Provider);
        assert_eq!(config.backoff.initial_ms, 500);
        assert_eq!(config.backoff.steps, 3);
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.cluster_scope().unwrap().unwrap().to_string(),
            "172.16.0.0/12"
        );
    }

    #[test]
    fn test_bad_cluster_cidr() {
        let config = RouteConfig {
            cluster_cidr: Some("172.16.0.0".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.cluster_scope(), Err(RouteError::Config(_))));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            RouteConfig::from_yaml("configureRoutes: maybe"),
            Err(RouteError::Config(_))
        ));
    }
}
