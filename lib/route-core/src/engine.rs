//! Route table reconciliation
//!
//! One pass over a table lists its routes, deletes routes that collide with
//! node pod CIDRs, then makes sure every eligible node has its route and is
//! marked network-available. Failures on a single route or node are recorded
//! in the [`PassReport`] and never stop the rest of the pass; only a failed
//! listing aborts it. Every provider and cluster operation runs under the
//! configured call timeout, so a hung call fails one route or node and the
//! pass moves on. Nothing is rolled back; the next pass picks up whatever
//! this one left behind.

use crate::cidr::classify;
use crate::cluster::{ClusterState, REASON_CREATE_ROUTE_FAILED};
use crate::config::RouteConfig;
use crate::conflict::conflicts_with_nodes;
use crate::eligibility::{check_eligibility, EligibleNode, SkipReason};
use crate::lookup::{find_route, LookupStrategy};
use crate::metrics::RouteMetrics;
use crate::mutator::RouteMutator;
use crate::provider::VpcProvider;
use crate::table::resolve_route_tables;
use crate::{Result, RouteError};
use futures::future::join_all;
use ipnetwork::Ipv4Network;
use route_api::{ConditionStatus, NodeSnapshot, Route};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// What happened to an existing route during the prune step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Outside the cluster scope; left untouched
    OutOfScope,
    /// In scope and not conflicting
    Kept,
    /// Conflicted with a node and was deleted
    Deleted,
    /// Conflicted with a node but the delete failed
    DeleteFailed(String),
    /// Destination CIDR does not parse; skipped
    Unparsable(String),
}

/// Result of pushing network readiness to a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionUpdate {
    Pushed,
    /// NetworkUnavailable was already False
    AlreadyAvailable,
    Failed(String),
}

/// What happened to a node during the create step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    Skipped(SkipReason),
    Created(ConditionUpdate),
    RouteExists(ConditionUpdate),
    /// The provider no longer knows the node's instance
    InstanceGone(ConditionUpdate),
    CreateFailed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteReport {
    pub name: String,
    pub destination_cidr: String,
    pub outcome: RouteOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeReport {
    pub node: String,
    pub outcome: NodeOutcome,
}

/// Per-route and per-node outcomes of one table pass, in input order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub table: String,
    pub routes: Vec<RouteReport>,
    pub nodes: Vec<NodeReport>,
}

impl PassReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    pub fn route_outcome(&self, destination_cidr: &str) -> Option<&RouteOutcome> {
        self.routes
            .iter()
            .find(|r| r.destination_cidr == destination_cidr)
            .map(|r| &r.outcome)
    }

    pub fn node_outcome(&self, node: &str) -> Option<&NodeOutcome> {
        self.nodes.iter().find(|n| n.node == node).map(|n| &n.outcome)
    }

    pub fn deleted(&self) -> usize {
        self.routes
            .iter()
            .filter(|r| r.outcome == RouteOutcome::Deleted)
            .count()
    }

    pub fn created(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.outcome, NodeOutcome::Created(_)))
            .count()
    }

    /// Routes and nodes whose operation failed
    pub fn failures(&self) -> usize {
        let routes = self
            .routes
            .iter()
            .filter(|r| matches!(r.outcome, RouteOutcome::DeleteFailed(_)))
            .count();
        let nodes = self
            .nodes
            .iter()
            .filter(|n| {
                matches!(
                    n.outcome,
                    NodeOutcome::CreateFailed(_)
                        | NodeOutcome::Created(ConditionUpdate::Failed(_))
                        | NodeOutcome::RouteExists(ConditionUpdate::Failed(_))
                        | NodeOutcome::InstanceGone(ConditionUpdate::Failed(_))
                )
            })
            .count();
        routes + nodes
    }
}

/// Outcome of reconciling one resolved table
#[derive(Debug)]
pub struct TableResult {
    pub table: String,
    pub result: Result<PassReport>,
}

enum Ensured {
    Created,
    Exists,
    InstanceGone,
}

/// Reconciler keeps VPC route tables in line with node pod CIDRs
pub struct Reconciler {
    provider: Arc<dyn VpcProvider>,
    cluster: Arc<dyn ClusterState>,
    mutator: RouteMutator,
    scope: Option<Ipv4Network>,
    table_override: Option<String>,
    configure_routes: bool,
    lookup: LookupStrategy,
    call_timeout: Duration,
    metrics: RouteMetrics,
}

impl Reconciler {
    /// Build a reconciler; fails if the cluster CIDR does not parse
    pub fn new(
        provider: Arc<dyn VpcProvider>,
        cluster: Arc<dyn ClusterState>,
        config: &RouteConfig,
        metrics: RouteMetrics,
    ) -> Result<Self> {
        Ok(Self {
            mutator: RouteMutator::new(provider.clone(), config.backoff.clone()),
            provider,
            cluster,
            scope: config.cluster_scope()?,
            table_override: config.route_table_ids.clone(),
            configure_routes: config.configure_routes,
            lookup: config.lookup,
            call_timeout: config.call_timeout(),
            metrics,
        })
    }

    pub fn metrics(&self) -> &RouteMetrics {
        &self.metrics
    }

    /// Reconcile every resolved route table against the current nodes
    ///
    /// Fails only if tables cannot be resolved or nodes cannot be listed.
    /// Each table's pass fails independently of the others.
    pub async fn reconcile(&self) -> Result<Vec<TableResult>> {
        let tables = self
            .bounded(
                || "resolving route tables".to_string(),
                resolve_route_tables(self.provider.as_ref(), self.table_override.as_deref()),
            )
            .await?;
        let nodes = self
            .bounded(|| "listing nodes".to_string(), self.cluster.list_nodes())
            .await?;
        debug!(tables = tables.len(), nodes = nodes.len(), "Starting route reconciliation");

        let nodes = &nodes;
        let passes = tables.into_iter().map(|table| async move {
            let result = self.reconcile_table(&table, nodes).await;
            TableResult { table, result }
        });
        Ok(join_all(passes).await)
    }

    /// Run one list/prune/create pass over `table`
    #[instrument(skip(self, nodes), fields(nodes = nodes.len()))]
    pub async fn reconcile_table(&self, table: &str, nodes: &[NodeSnapshot]) -> Result<PassReport> {
        let listed = self.bounded(
            || format!("listing routes of table {}", table),
            async { self.provider.list_route(table).await.map_err(RouteError::from) },
        );
        let routes = match listed.await {
            Ok(routes) => routes,
            Err(e) => {
                error!(error = %e, "Error listing routes");
                self.metrics.record_error("list");
                self.record_pass("error");
                return Err(e);
            }
        };

        let mut report = PassReport::new(table);
        let mut remaining = Vec::with_capacity(routes.len());
        for route in routes {
            let outcome = self.prune_route(table, &route, nodes).await;
            report.routes.push(RouteReport {
                name: route.name.clone(),
                destination_cidr: route.destination_cidr.clone(),
                outcome: outcome.clone(),
            });
            if outcome != RouteOutcome::Deleted {
                remaining.push(route);
            }
        }

        let cached = match self.lookup {
            LookupStrategy::Listed => Some(remaining.as_slice()),
            LookupStrategy::Provider => None,
        };
        for node in nodes {
            let outcome = self.sync_node(table, node, cached).await;
            report.nodes.push(NodeReport {
                node: node.name.clone(),
                outcome,
            });
        }

        info!(
            deleted = report.deleted(),
            created = report.created(),
            failures = report.failures(),
            "Route table reconciled"
        );
        self.record_pass("success");
        Ok(report)
    }

    async fn prune_route(&self, table: &str, route: &Route, nodes: &[NodeSnapshot]) -> RouteOutcome {
        let containment = match classify(self.scope.as_ref(), &route.destination_cidr) {
            Ok(containment) => containment,
            Err(e) => {
                error!(
                    scope = ?self.scope,
                    route = %route.destination_cidr,
                    error = %e,
                    "Error checking route against cluster cidr"
                );
                return RouteOutcome::Unparsable(e.to_string());
            }
        };
        if !containment.in_scope {
            return RouteOutcome::OutOfScope;
        }
        if !conflicts_with_nodes(&route.destination_cidr, nodes) {
            return RouteOutcome::Kept;
        }

        info!(name = %route.name, cidr = %route.destination_cidr, "Delete conflicting route");
        let deleted = self.bounded(
            || format!("deleting route {}", route.destination_cidr),
            self.mutator
                .delete_route(table, &route.provider_id, &route.destination_cidr),
        );
        match deleted.await {
            Ok(()) => {
                info!(name = %route.name, cidr = %route.destination_cidr, "Delete route SUCCESS");
                self.metrics.routes_deleted_total.inc();
                RouteOutcome::Deleted
            }
            Err(e) => {
                error!(
                    name = %route.name,
                    cidr = %route.destination_cidr,
                    error = %e,
                    "Could not delete route"
                );
                self.metrics.record_error("delete");
                RouteOutcome::DeleteFailed(e.to_string())
            }
        }
    }

    async fn sync_node(
        &self,
        table: &str,
        node: &NodeSnapshot,
        cached: Option<&[Route]>,
    ) -> NodeOutcome {
        let eligible = match check_eligibility(node, self.configure_routes) {
            Ok(eligible) => eligible,
            Err(reason) => {
                debug!(node = %node.name, reason = %reason, "Skipping node");
                return NodeOutcome::Skipped(reason);
            }
        };

        let ensured = self.bounded(
            || format!("creating route for node {}", node.name),
            self.ensure_route(table, &eligible, cached),
        );
        let ensured = match ensured.await {
            Ok(ensured) => ensured,
            Err(e) => {
                error!(node = %node.name, error = %e, "Try create route error");
                self.metrics.record_error("create");
                let message = format!("Create Route Failed for {} reason: {}", table, e);
                let event = self
                    .cluster
                    .emit_warning_event(node, REASON_CREATE_ROUTE_FAILED, &message);
                if tokio::time::timeout(self.call_timeout, event).await.is_err() {
                    warn!(node = %node.name, "Timed out emitting create route event");
                }
                return NodeOutcome::CreateFailed(e.to_string());
            }
        };

        let condition = self.mark_network_available(node).await;
        match ensured {
            Ensured::Created => NodeOutcome::Created(condition),
            Ensured::Exists => NodeOutcome::RouteExists(condition),
            Ensured::InstanceGone => NodeOutcome::InstanceGone(condition),
        }
    }

    async fn ensure_route(
        &self,
        table: &str,
        eligible: &EligibleNode<'_>,
        cached: Option<&[Route]>,
    ) -> Result<Ensured> {
        let existing = find_route(
            self.provider.as_ref(),
            table,
            eligible.provider_id,
            &eligible.pod_cidr,
            cached,
        )
        .await?;
        if existing.is_some() {
            debug!(node = %eligible.node.name, cidr = %eligible.pod_cidr, "Route already exists");
            return Ok(Ensured::Exists);
        }

        let start = Instant::now();
        let created = self
            .mutator
            .create_route(table, eligible.provider_id, &eligible.pod_cidr)
            .await;
        self.metrics
            .route_create_duration_seconds
            .observe(start.elapsed().as_secs_f64());

        match created? {
            Some(route) => {
                info!(
                    node = %eligible.node.name,
                    cidr = %route.destination_cidr,
                    name = %route.name,
                    "Created route for node"
                );
                self.metrics.routes_created_total.inc();
                Ok(Ensured::Created)
            }
            None => Ok(Ensured::InstanceGone),
        }
    }

    async fn mark_network_available(&self, node: &NodeSnapshot) -> ConditionUpdate {
        if node.network_unavailable == Some(ConditionStatus::False) {
            return ConditionUpdate::AlreadyAvailable;
        }
        let update = self.bounded(
            || format!("updating network condition of node {}", node.name),
            self.cluster.update_network_condition(node, true),
        );
        match update.await {
            Ok(()) => ConditionUpdate::Pushed,
            Err(e) => {
                error!(node = %node.name, error = %e, "Update node network condition error");
                self.metrics.record_error("condition");
                ConditionUpdate::Failed(e.to_string())
            }
        }
    }

    /// Run `call` under the call timeout; `operation` names it in the error
    async fn bounded<T>(
        &self,
        operation: impl FnOnce() -> String,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RouteError::Timeout(operation())),
        }
    }

    fn record_pass(&self, result: &str) {
        self.metrics
            .reconcile_passes_total
            .with_label_values(&[result])
            .inc();
    }
}
