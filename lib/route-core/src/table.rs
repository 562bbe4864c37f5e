//! Route table resolution

use crate::provider::VpcProvider;
use crate::{Result, RouteError};
use tracing::debug;

/// Decide which route tables to reconcile
///
/// A non-empty operator override wins and is split on commas without asking
/// the provider. Otherwise the VPC must have exactly one route table.
pub async fn resolve_route_tables(
    provider: &dyn VpcProvider,
    table_override: Option<&str>,
) -> Result<Vec<String>> {
    if let Some(ids) = table_override.filter(|ids| !ids.is_empty()) {
        return Ok(ids.split(',').map(str::to_string).collect());
    }

    let vpc_id = provider.vpc_id()?;
    let tables = provider.list_route_tables(&vpc_id).await?;
    debug!(vpc_id = %vpc_id, count = tables.len(), "Discovered route tables");

    match tables.len() {
        0 => Err(RouteError::NoTable(vpc_id)),
        1 => Ok(tables),
        count => Err(RouteError::AmbiguousTable { vpc_id, count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockVpcProvider, ProviderError};

    #[tokio::test]
    async fn test_override_skips_provider() {
        let mut provider = MockVpcProvider::new();
        provider.expect_vpc_id().times(0);
        provider.expect_list_route_tables().times(0);

        let tables = resolve_route_tables(&provider, Some("rt-1,rt-2")).await.unwrap();
        assert_eq!(tables, vec!["rt-1", "rt-2"]);
    }

    #[tokio::test]
    async fn test_empty_override_discovers() {
        let mut provider = MockVpcProvider::new();
        provider.expect_vpc_id().returning(|| Ok("vpc-1".to_string()));
        provider.expect_list_route_tables().times(1).returning(|vpc| {
            assert_eq!(vpc, "vpc-1");
            Ok(vec!["rt-1".to_string()])
        });

        let tables = resolve_route_tables(&provider, Some("")).await.unwrap();
        assert_eq!(tables, vec!["rt-1"]);
    }

    #[tokio::test]
    async fn test_no_tables() {
        let mut provider = MockVpcProvider::new();
        provider.expect_vpc_id().returning(|| Ok("vpc-1".to_string()));
        provider.expect_list_route_tables().returning(|_| Ok(vec![]));

        let err = resolve_route_tables(&provider, None).await.unwrap_err();
        assert!(matches!(err, RouteError::NoTable(vpc) if vpc == "vpc-1"));
    }

    #[tokio::test]
    async fn test_multiple_tables() {
        let mut provider = MockVpcProvider::new();
        provider.expect_vpc_id().returning(|| Ok("vpc-1".to_string()));
        provider
            .expect_list_route_tables()
            .returning(|_| Ok(vec!["rt-1".to_string(), "rt-2".to_string()]));

        let err = resolve_route_tables(&provider, None).await.unwrap_err();
        assert!(matches!(err, RouteError::AmbiguousTable { count: 2, .. }));
    }

    #[tokio::test]
    async fn test_vpc_id_failure() {
        let mut provider = MockVpcProvider::new();
        provider
            .expect_vpc_id()
            .returning(|| Err(ProviderError::transient("metadata server unreachable")));
        provider.expect_list_route_tables().times(0);

        let err = resolve_route_tables(&provider, None).await.unwrap_err();
        assert!(matches!(err, RouteError::Provider(_)));
    }
}
