//! Core route reconciliation functionality
//!
//! This library provides:
//! - CIDR containment and conflict detection between routes and node pod CIDRs
//! - Node eligibility rules for route management
//! - Route table resolution and cached route lookup
//! - Backoff-guarded route mutation through a cloud provider
//! - The per-table reconciliation engine

pub mod backoff;
pub mod cidr;
pub mod cluster;
pub mod config;
pub mod conflict;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod metrics;
pub mod mutator;
pub mod provider;
pub mod table;

pub use backoff::BackoffPolicy;
pub use cluster::ClusterState;
pub use config::RouteConfig;
pub use engine::{NodeOutcome, PassReport, Reconciler, RouteOutcome, TableResult};
pub use error::{Result, RouteError};
pub use lookup::LookupStrategy;
pub use metrics::RouteMetrics;
pub use mutator::RouteMutator;
pub use provider::{MemoryVpc, ProviderError, ProviderErrorKind, VpcProvider};
