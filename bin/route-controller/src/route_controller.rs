//! Periodic route table reconciliation

use route_core::{Reconciler, TableResult};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct RouteController {
    reconciler: Reconciler,
    sync_period: Duration,
}

impl RouteController {
    pub fn new(reconciler: Reconciler, sync_period: Duration) -> Self {
        Self {
            reconciler,
            sync_period,
        }
    }

    /// Reconcile every sync period until ctrl-c
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Starting route reconciliation every {:?}", self.sync_period);

        loop {
            self.sync_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.sync_period) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, exiting...");
                    return Ok(());
                }
            }
        }
    }

    /// Run one reconciliation over all tables; failures are retried next period
    pub async fn sync_once(&self) {
        match self.reconciler.reconcile().await {
            Ok(results) => {
                for TableResult { table, result } in results {
                    match result {
                        Ok(report) => info!(
                            table = %table,
                            created = report.created(),
                            deleted = report.deleted(),
                            failures = report.failures(),
                            "Route table pass finished"
                        ),
                        Err(e) => warn!(table = %table, error = %e, "Route table pass failed"),
                    }
                }
            }
            Err(e) => error!(error = %e, "Error reconciling routes"),
        }

        match self.reconciler.metrics().gather() {
            Ok(text) => debug!("Route metrics:\n{}", text),
            Err(e) => warn!(error = %e, "Failed to gather route metrics"),
        }
    }
}
