//! Kubernetes integration for the route controller
//!
//! Implements the cluster-state capability on top of the Kubernetes API:
//! node listing, NetworkUnavailable condition updates and Warning events.

pub mod cluster;
pub mod conditions;
pub mod error;
pub mod events;

pub use cluster::KubeClusterState;
pub use error::{KubeError, Result};
