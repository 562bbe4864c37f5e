//! Selection of nodes that take part in route creation

use route_api::node::PodCidr;
use route_api::{ConditionStatus, NodeSnapshot};
use std::fmt;

/// Why a node was left out of route creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Node route management is disabled globally
    RoutesDisabled,
    /// Node carries an exclude label
    Excluded,
    /// Kubelet stopped reporting; Ready is Unknown
    ReadyUnknown,
    /// Node has no provider id yet
    NoProviderId,
    /// Node has no IPv4 pod CIDR assigned
    NoPodCidr,
    /// Node's pod CIDR does not parse
    InvalidPodCidr(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::RoutesDisabled => write!(f, "route management disabled"),
            SkipReason::Excluded => write!(f, "node excluded by label"),
            SkipReason::ReadyUnknown => write!(f, "node readiness unknown"),
            SkipReason::NoProviderId => write!(f, "node has no provider id"),
            SkipReason::NoPodCidr => write!(f, "node has no IPv4 pod cidr"),
            SkipReason::InvalidPodCidr(cidr) => write!(f, "invalid pod cidr {}", cidr),
        }
    }
}

/// A node cleared for route creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibleNode<'a> {
    pub node: &'a NodeSnapshot,
    pub provider_id: &'a str,
    /// Normalized pod CIDR text, e.g. "10.1.0.0/24"
    pub pod_cidr: String,
}

/// Decide whether `node` gets a route this pass
pub fn check_eligibility(
    node: &NodeSnapshot,
    configure_routes: bool,
) -> Result<EligibleNode<'_>, SkipReason> {
    if !configure_routes {
        return Err(SkipReason::RoutesDisabled);
    }
    if node.has_exclude_label() {
        return Err(SkipReason::Excluded);
    }
    if node.ready == Some(ConditionStatus::Unknown) {
        return Err(SkipReason::ReadyUnknown);
    }
    if node.provider_id.is_empty() {
        return Err(SkipReason::NoProviderId);
    }
    let pod_cidr = match &node.pod_cidr {
        PodCidr::Ipv4(net) => net.to_string(),
        PodCidr::Unassigned => return Err(SkipReason::NoPodCidr),
        PodCidr::Invalid(cidr) => return Err(SkipReason::InvalidPodCidr(cidr.clone())),
    };

    Ok(EligibleNode {
        node,
        provider_id: &node.provider_id,
        pod_cidr,
    })
}
