//! Detection of stale routes that collide with node pod CIDRs

use crate::cidr::classify;
use route_api::node::PodCidr;
use route_api::NodeSnapshot;
use tracing::{error, warn};

/// Whether `destination` is a proper sub-range of some node's pod CIDR
///
/// Such a route is left over from an earlier allocation and must go before
/// the node's own route can be trusted. A route equal to the pod CIDR is
/// the node's own route and never conflicts.
pub fn conflicts_with_nodes(destination: &str, nodes: &[NodeSnapshot]) -> bool {
    for node in nodes {
        let pod_cidr = match &node.pod_cidr {
            PodCidr::Ipv4(net) => net,
            PodCidr::Unassigned => continue,
            PodCidr::Invalid(cidr) => {
                error!(node = %node.name, pod_cidr = %cidr, "Error getting IPv4 pod CIDR from node");
                continue;
            }
        };

        match classify(Some(pod_cidr), destination) {
            Ok(containment) if containment.strictly_contained => {
                warn!(
                    node = %node.name,
                    pod_cidr = %pod_cidr,
                    route = %destination,
                    "Conflicting route with node found"
                );
                return true;
            }
            Ok(_) => {}
            Err(e) => {
                error!(
                    node = %node.name,
                    route = %destination,
                    error = %e,
                    "Error getting conflict state from node"
                );
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, pod_cidr: &str) -> NodeSnapshot {
        NodeSnapshot::new(name).with_pod_cidr(pod_cidr)
    }

    #[test]
    fn test_no_nodes_no_conflict() {
        assert!(!conflicts_with_nodes("10.1.0.0/24", &[]));
    }

    #[test]
    fn test_sub_range_conflicts() {
        let nodes = vec![node("a", "10.1.0.0/24"), node("b", "10.2.0.0/24")];
        assert!(conflicts_with_nodes("10.2.0.128/25", &nodes));
    }

    #[test]
    fn test_own_route_does_not_conflict() {
        let nodes = vec![node("a", "10.1.0.0/24")];
        assert!(!conflicts_with_nodes("10.1.0.0/24", &nodes));
    }

    #[test]
    fn test_unrelated_and_wider_routes_do_not_conflict() {
        let nodes = vec![node("a", "10.1.0.0/24")];
        assert!(!conflicts_with_nodes("10.99.0.0/24", &nodes));
        assert!(!conflicts_with_nodes("10.0.0.0/8", &nodes));
    }

    #[test]
    fn test_nodes_without_valid_cidr_are_ignored() {
        let nodes = vec![node("a", ""), node("b", "bogus/24"), node("c", "10.3.0.0/24")];
        assert!(!conflicts_with_nodes("10.1.0.0/25", &nodes));
        assert!(conflicts_with_nodes("10.3.0.0/25", &nodes));
    }

    #[test]
    fn test_unparsable_route_never_conflicts() {
        let nodes = vec![node("a", "10.1.0.0/24")];
        assert!(!conflicts_with_nodes("garbage", &nodes));
    }
}
