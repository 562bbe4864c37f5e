//! Datum route controller data model
//!
//! This library defines the types shared by the route reconciliation engine
//! and its collaborators:
//! - Route: one entry in a cloud VPC route table
//! - NodeSnapshot: the per-pass view of a cluster node
//! - Well-known node labels and condition types

pub mod labels;
pub mod node;
pub mod route;

pub use node::{ConditionStatus, NodeSnapshot, PodCidr};
pub use route::Route;
