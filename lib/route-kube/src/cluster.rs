//! Cluster state backed by the Kubernetes API

use crate::conditions::network_condition_patch;
use crate::events::{node_reference, warning_event};
use crate::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::Client;
use kube_runtime::events::{Recorder, Reporter};
use route_api::NodeSnapshot;
use route_core::ClusterState;
use tracing::{debug, info, warn};

/// KubeClusterState reads nodes and reports route readiness through the API server
pub struct KubeClusterState {
    client: Client,
    reporter: Reporter,
}

impl KubeClusterState {
    /// Create a cluster state client for the given controller name
    ///
    /// The controller name appears as the reporting component on Events.
    pub fn new(client: Client, controller_name: &str) -> Self {
        Self {
            client,
            reporter: Reporter {
                controller: controller_name.to_string(),
                instance: None,
            },
        }
    }

    /// Create a client from the default kubeconfig or in-cluster config
    pub async fn try_default(controller_name: &str) -> anyhow::Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, controller_name))
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    async fn snapshot_nodes(&self) -> Result<Vec<NodeSnapshot>> {
        let list = self.nodes().list(&ListParams::default()).await?;
        debug!("Listed {} nodes", list.items.len());
        Ok(list.items.iter().map(NodeSnapshot::from).collect())
    }

    async fn patch_network_condition(&self, name: &str, available: bool) -> Result<()> {
        let patch = network_condition_patch(available, chrono::Utc::now());
        self.nodes()
            .patch_status(name, &PatchParams::default(), &Patch::Strategic(&patch))
            .await?;
        info!(node = %name, available, "Updated node network condition");
        Ok(())
    }
}

#[async_trait]
impl ClusterState for KubeClusterState {
    async fn list_nodes(&self) -> route_core::Result<Vec<NodeSnapshot>> {
        Ok(self.snapshot_nodes().await?)
    }

    async fn update_network_condition(
        &self,
        node: &NodeSnapshot,
        available: bool,
    ) -> route_core::Result<()> {
        Ok(self.patch_network_condition(&node.name, available).await?)
    }

    async fn emit_warning_event(&self, node: &NodeSnapshot, reason: &str, message: &str) {
        let recorder = Recorder::new(
            self.client.clone(),
            self.reporter.clone(),
            node_reference(node),
        );
        if let Err(e) = recorder.publish(warning_event(reason, message)).await {
            warn!(
                node = %node.name,
                reason,
                error = %e,
                "Failed to publish Kubernetes event"
            );
        }
    }
}
