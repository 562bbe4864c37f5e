//! NetworkUnavailable condition patches

use chrono::{DateTime, Utc};
use route_api::labels::CONDITION_NETWORK_UNAVAILABLE;
use route_api::ConditionStatus;
use serde_json::{json, Value};

/// Reason set when the node's route exists
pub const REASON_ROUTE_CREATED: &str = "RouteCreated";
/// Reason set when the node's route could not be created
pub const REASON_NO_ROUTE_CREATED: &str = "NoRouteCreated";

/// Build the status patch for a node's NetworkUnavailable condition
///
/// Node conditions merge by type under a strategic merge patch, so only the
/// NetworkUnavailable entry is touched.
pub fn network_condition_patch(available: bool, now: DateTime<Utc>) -> Value {
    let (status, reason, message) = if available {
        (
            ConditionStatus::False,
            REASON_ROUTE_CREATED,
            "RouteController created a route",
        )
    } else {
        (
            ConditionStatus::True,
            REASON_NO_ROUTE_CREATED,
            "RouteController failed to create a route",
        )
    };
    let timestamp = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    json!({
        "status": {
            "conditions": [{
                "type": CONDITION_NETWORK_UNAVAILABLE,
                "status": status.as_str(),
                "reason": reason,
                "message": message,
                "lastTransitionTime": timestamp,
                "lastHeartbeatTime": timestamp,
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_available_patch() {
        let patch = network_condition_patch(true, now());
        let condition = &patch["status"]["conditions"][0];
        assert_eq!(condition["type"], "NetworkUnavailable");
        assert_eq!(condition["status"], "False");
        assert_eq!(condition["reason"], REASON_ROUTE_CREATED);
        assert_eq!(condition["lastTransitionTime"], "2024-05-01T12:00:00Z");
        assert_eq!(condition["lastHeartbeatTime"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_unavailable_patch() {
        let patch = network_condition_patch(false, now());
        let condition = &patch["status"]["conditions"][0];
        assert_eq!(condition["status"], "True");
        assert_eq!(condition["reason"], REASON_NO_ROUTE_CREATED);
    }
}
