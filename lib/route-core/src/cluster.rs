//! Cluster state capability consumed by the route controller

use crate::Result;
use async_trait::async_trait;
use route_api::NodeSnapshot;

#[cfg(test)]
use mockall::automock;

/// Event reason attached to a node whose route could not be created
pub const REASON_CREATE_ROUTE_FAILED: &str = "CreateRouteFailed";

/// Read nodes and report network readiness back to the cluster
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterState: Send + Sync {
    /// Snapshot every node in the cluster
    async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>>;

    /// Set the node's NetworkUnavailable condition
    ///
    /// `available = true` marks pod networking as configured (status False).
    async fn update_network_condition(&self, node: &NodeSnapshot, available: bool) -> Result<()>;

    /// Publish a Warning event on the node
    ///
    /// Fire-and-forget: implementations log failures and never return them.
    async fn emit_warning_event(&self, node: &NodeSnapshot, reason: &str, message: &str);
}
