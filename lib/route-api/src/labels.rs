//! Well-known node labels and condition types consulted by the route controller

/// Nodes carrying this label are excluded from route management
pub const LABEL_EXCLUDE_NODE: &str = "service.alibabacloud.com/exclude-node";
/// Deprecated spelling of [`LABEL_EXCLUDE_NODE`], still honored
pub const LABEL_EXCLUDE_NODE_DEPRECATED: &str = "service.beta.kubernetes.io/exclude-node";

/// Node condition reporting kubelet readiness
pub const CONDITION_READY: &str = "Ready";
/// Node condition reporting whether pod networking is configured
pub const CONDITION_NETWORK_UNAVAILABLE: &str = "NetworkUnavailable";
