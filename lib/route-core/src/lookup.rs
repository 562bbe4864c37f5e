//! Route lookup against a cached listing or the provider

use crate::provider::VpcProvider;
use crate::{Result, RouteError};
use route_api::Route;
use serde::{Deserialize, Serialize};

/// Where the engine looks for an existing route before creating one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStrategy {
    /// Scan the routes listed at the start of the pass
    #[default]
    Listed,
    /// Ask the provider for every lookup
    Provider,
}

/// Find a route by provider id, destination CIDR, or both
///
/// With a non-empty cache the first matching entry wins and a miss is
/// `Ok(None)`. An empty or absent cache delegates to the provider.
pub async fn find_route(
    provider: &dyn VpcProvider,
    table: &str,
    provider_id: &str,
    cidr: &str,
    cached: Option<&[Route]>,
) -> Result<Option<Route>> {
    if provider_id.is_empty() && cidr.is_empty() {
        return Err(RouteError::InvalidQuery);
    }

    match cached {
        Some(routes) if !routes.is_empty() => Ok(routes
            .iter()
            .find(|route| {
                (provider_id.is_empty() || route.provider_id == provider_id)
                    && (cidr.is_empty() || route.destination_cidr == cidr)
            })
            .cloned()),
        _ => Ok(provider.find_route(table, provider_id, cidr).await?),
    }
}
