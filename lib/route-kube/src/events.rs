//! Kubernetes Events for nodes
//!
//! Events are fire-and-forget: a failed publish is logged and never breaks
//! reconciliation.

use k8s_openapi::api::core::v1::ObjectReference;
use kube_runtime::events::{Event, EventType};
use route_api::NodeSnapshot;

/// Action recorded on route creation events
pub const ACTION_CREATE_ROUTE: &str = "CreateRoute";

/// Reference to a cluster-scoped Node object
pub fn node_reference(node: &NodeSnapshot) -> ObjectReference {
    ObjectReference {
        api_version: Some("v1".to_string()),
        kind: Some("Node".to_string()),
        name: Some(node.name.clone()),
        uid: node.uid.clone(),
        ..Default::default()
    }
}

pub fn warning_event(reason: &str, message: &str) -> Event {
    Event {
        type_: EventType::Warning,
        reason: reason.to_string(),
        note: Some(message.to_string()),
        action: ACTION_CREATE_ROUTE.to_string(),
        secondary: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_reference() {
        let mut node = NodeSnapshot::new("node-a");
        node.uid = Some("uid-1".to_string());

        let reference = node_reference(&node);
        assert_eq!(reference.kind.as_deref(), Some("Node"));
        assert_eq!(reference.api_version.as_deref(), Some("v1"));
        assert_eq!(reference.name.as_deref(), Some("node-a"));
        assert_eq!(reference.uid.as_deref(), Some("uid-1"));
        assert_eq!(reference.namespace, None);
    }

    #[test]
    fn test_warning_event() {
        let event = warning_event("CreateRouteFailed", "Create Route Failed for rt-1");
        assert!(matches!(event.type_, EventType::Warning));
        assert_eq!(event.reason, "CreateRouteFailed");
        assert_eq!(event.action, ACTION_CREATE_ROUTE);
        assert_eq!(event.note.as_deref(), Some("Create Route Failed for rt-1"));
    }
}
