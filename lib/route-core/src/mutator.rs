//! Route creation and deletion guarded by backoff

use crate::backoff::{retry_with_backoff, Attempt, BackoffPolicy};
use crate::provider::VpcProvider;
use crate::{Result, RouteError};
use route_api::Route;
use std::sync::Arc;
use tracing::{error, info};

/// RouteMutator applies route changes through a [`VpcProvider`]
pub struct RouteMutator {
    provider: Arc<dyn VpcProvider>,
    backoff: BackoffPolicy,
}

impl RouteMutator {
    pub fn new(provider: Arc<dyn VpcProvider>, backoff: BackoffPolicy) -> Self {
        Self { provider, backoff }
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Create the route for an instance, retrying transient failures
    ///
    /// Returns `Ok(None)` when the provider reports the instance as gone;
    /// there is nothing left to route to.
    pub async fn create_route(
        &self,
        table: &str,
        provider_id: &str,
        cidr: &str,
    ) -> Result<Option<Route>> {
        let outcome = retry_with_backoff(&self.backoff, "create_route", || async move {
            match self.provider.create_route(table, provider_id, cidr).await {
                Ok(route) => Attempt::Done(Some(route)),
                Err(e) if e.is_not_found() => {
                    info!(provider_id = %provider_id, error = %e, "Instance not found, skipping route");
                    Attempt::Done(None)
                }
                Err(e) => {
                    error!(
                        table = %table,
                        provider_id = %provider_id,
                        cidr = %cidr,
                        kind = ?e.kind,
                        error = %e,
                        "Backoff creating route"
                    );
                    Attempt::Retry(e)
                }
            }
        })
        .await;

        outcome.map_err(|source| RouteError::CreateExhausted {
            provider_id: provider_id.to_string(),
            source,
        })
    }

    /// Delete a route with a single provider call
    pub async fn delete_route(&self, table: &str, provider_id: &str, cidr: &str) -> Result<()> {
        info!(table = %table, provider_id = %provider_id, cidr = %cidr, "Delete route for node");
        self.provider.delete_route(table, provider_id, cidr).await?;
        Ok(())
    }
}
