use serde::{Deserialize, Serialize};

/// Route is a single destination CIDR -> instance entry in a VPC route table
///
/// Routes are owned by the cloud provider; the controller only holds
/// read-only copies fetched during a reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Route table the entry belongs to
    pub table_id: String,

    /// Destination IPv4 prefix, e.g. "10.1.0.0/24"
    pub destination_cidr: String,

    /// Provider-assigned instance id of the next hop (empty until bound)
    #[serde(default)]
    pub provider_id: String,

    /// Provider-side name of the entry
    #[serde(default)]
    pub name: String,
}

impl Route {
    pub fn new(
        table_id: impl Into<String>,
        destination_cidr: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            destination_cidr: destination_cidr.into(),
            provider_id: provider_id.into(),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_serializes_camel_case() {
        let route = Route::new("rt-1", "10.1.0.0/24", "i-abc").with_name("node-a");
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["tableId"], "rt-1");
        assert_eq!(json["destinationCidr"], "10.1.0.0/24");
        assert_eq!(json["providerId"], "i-abc");
        assert_eq!(json["name"], "node-a");
    }

    #[test]
    fn test_route_defaults_optional_fields() {
        let route: Route =
            serde_json::from_str(r#"{"tableId":"rt-1","destinationCidr":"10.1.0.0/24"}"#).unwrap();
        assert!(route.provider_id.is_empty());
        assert!(route.name.is_empty());
    }
}
