//! Cloud provider capability consumed by the route controller
//!
//! The reconciliation engine never talks to a cloud SDK directly. Everything
//! it needs from the VPC lives behind [`VpcProvider`], so the engine can be
//! driven by a real cloud client, the in-memory [`MemoryVpc`], or a mock.

pub mod memory;

pub use memory::MemoryVpc;

use async_trait::async_trait;
use route_api::Route;
use std::fmt;

#[cfg(test)]
use mockall::automock;

/// Classification of a provider failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The target instance or route no longer exists
    NotFound,
    /// The API rejected the call due to rate limiting
    Throttled,
    /// Network or server-side failure worth retrying
    Transient,
    /// Anything the provider could not classify
    Other,
}

/// Error returned by a [`VpcProvider`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    /// Whether the failure means the target instance is gone
    ///
    /// Untyped SDK errors only carry a message, so a "not found" substring is
    /// also accepted. This match is fragile against vendor wording changes.
    pub fn is_not_found(&self) -> bool {
        self.kind == ProviderErrorKind::NotFound || self.message.contains("not found")
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Route table operations of a cloud VPC
///
/// All calls are blocking network operations on the provider side; dropping
/// the returned future cancels the call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VpcProvider: Send + Sync {
    /// List every route in a table
    async fn list_route(&self, table: &str) -> ProviderResult<Vec<Route>>;

    /// Create a route sending `cidr` to the instance behind `provider_id`
    async fn create_route(&self, table: &str, provider_id: &str, cidr: &str)
        -> ProviderResult<Route>;

    /// Delete the route for `cidr` pointing at `provider_id`
    async fn delete_route(&self, table: &str, provider_id: &str, cidr: &str)
        -> ProviderResult<()>;

    /// Find a route by provider id and/or destination CIDR
    async fn find_route(
        &self,
        table: &str,
        provider_id: &str,
        cidr: &str,
    ) -> ProviderResult<Option<Route>>;

    /// List the route table ids attached to a VPC
    async fn list_route_tables(&self, vpc_id: &str) -> ProviderResult<Vec<String>>;

    /// Id of the VPC the cluster runs in
    fn vpc_id(&self) -> ProviderResult<String>;
}
