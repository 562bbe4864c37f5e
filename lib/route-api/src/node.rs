//! Per-pass snapshot of a cluster node

use crate::labels::{
    CONDITION_NETWORK_UNAVAILABLE, CONDITION_READY, LABEL_EXCLUDE_NODE,
    LABEL_EXCLUDE_NODE_DEPRECATED,
};
use ipnetwork::{IpNetwork, Ipv4Network};
use k8s_openapi::api::core::v1::{Node, NodeCondition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Status of a node condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    /// Parse a Kubernetes condition status; anything unrecognized is Unknown
    pub fn parse(status: &str) -> Self {
        match status {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            _ => ConditionStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The IPv4 pod CIDR assigned to a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PodCidr {
    /// No IPv4 pod CIDR has been assigned
    Unassigned,
    /// A pod CIDR is present but could not be parsed
    Invalid(String),
    /// Parsed and normalized to its network address
    Ipv4(Ipv4Network),
}

impl PodCidr {
    /// Pick the node's IPv4 pod CIDR from its candidate entries
    ///
    /// Empty entries are ignored, IPv6 entries are skipped, and the first
    /// unparsable entry makes the whole assignment invalid.
    pub fn from_candidates<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Self {
        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            if !candidate.contains('/') {
                return PodCidr::Invalid(candidate.to_string());
            }
            match candidate.parse::<IpNetwork>() {
                Ok(IpNetwork::V4(net)) => return PodCidr::Ipv4(normalize(net)),
                Ok(IpNetwork::V6(_)) => continue,
                Err(_) => return PodCidr::Invalid(candidate.to_string()),
            }
        }
        PodCidr::Unassigned
    }

    pub fn network(&self) -> Option<&Ipv4Network> {
        match self {
            PodCidr::Ipv4(net) => Some(net),
            _ => None,
        }
    }
}

/// Mask off host bits so the network prints as e.g. "10.1.0.0/24"
pub fn normalize(net: Ipv4Network) -> Ipv4Network {
    Ipv4Network::new(net.network(), net.prefix()).unwrap_or(net)
}

/// NodeSnapshot is the read-only view of a node used for one reconciliation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Node name
    pub name: String,

    /// Node UID, used when referencing the node in Events
    pub uid: Option<String>,

    /// Cloud provider instance id (empty when not yet registered)
    pub provider_id: String,

    /// IPv4 pod CIDR assigned to the node
    pub pod_cidr: PodCidr,

    /// Status of the Ready condition, if reported
    pub ready: Option<ConditionStatus>,

    /// Status of the NetworkUnavailable condition, if reported
    pub network_unavailable: Option<ConditionStatus>,

    /// Node labels
    pub labels: BTreeMap<String, String>,
}

impl NodeSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: None,
            provider_id: String::new(),
            pod_cidr: PodCidr::Unassigned,
            ready: None,
            network_unavailable: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    pub fn with_pod_cidr(mut self, pod_cidr: &str) -> Self {
        self.pod_cidr = PodCidr::from_candidates([pod_cidr]);
        self
    }

    pub fn with_ready(mut self, status: ConditionStatus) -> Self {
        self.ready = Some(status);
        self
    }

    pub fn with_network_unavailable(mut self, status: ConditionStatus) -> Self {
        self.network_unavailable = Some(status);
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Whether the node opted out of route management via label
    pub fn has_exclude_label(&self) -> bool {
        self.labels.contains_key(LABEL_EXCLUDE_NODE)
            || self.labels.contains_key(LABEL_EXCLUDE_NODE_DEPRECATED)
    }
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        let spec = node.spec.as_ref();
        let pod_cidrs = spec
            .and_then(|s| s.pod_cidrs.as_ref())
            .map(|cidrs| cidrs.iter().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        let pod_cidr = spec.and_then(|s| s.pod_cidr.as_deref());

        let conditions: &[NodeCondition] = node
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_deref())
            .unwrap_or(&[]);
        let condition = |type_: &str| {
            conditions
                .iter()
                .find(|c| c.type_ == type_)
                .map(|c| ConditionStatus::parse(&c.status))
        };

        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            uid: node.metadata.uid.clone(),
            provider_id: spec.and_then(|s| s.provider_id.clone()).unwrap_or_default(),
            pod_cidr: PodCidr::from_candidates(pod_cidrs.into_iter().chain(pod_cidr)),
            ready: condition(CONDITION_READY),
            network_unavailable: condition(CONDITION_NETWORK_UNAVAILABLE),
            labels: node.metadata.labels.clone().unwrap_or_default(),
        }
    }
}
