//! In-memory VPC provider
//!
//! Keeps route tables in process memory. Used for tests and for running the
//! controller without a cloud account. Failures can be injected per call
//! type to exercise the engine's error paths.

use super::{ProviderError, ProviderResult, VpcProvider};
use async_trait::async_trait;
use route_api::Route;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    // table id -> routes, in insertion order
    tables: BTreeMap<String, Vec<Route>>,
    gone_instances: HashSet<String>,
    create_failures: VecDeque<ProviderError>,
    delete_failures: HashSet<String>,
    list_failures: HashSet<String>,
    next_id: usize,
}

/// Call counters for a [`MemoryVpc`]
#[derive(Default)]
struct CallCounts {
    list: AtomicUsize,
    create: AtomicUsize,
    delete: AtomicUsize,
    find: AtomicUsize,
}

/// MemoryVpc is a [`VpcProvider`] backed by process memory
#[derive(Clone)]
pub struct MemoryVpc {
    vpc_id: String,
    state: Arc<RwLock<MemoryState>>,
    calls: Arc<CallCounts>,
}

impl MemoryVpc {
    pub fn new(vpc_id: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            state: Arc::new(RwLock::new(MemoryState::default())),
            calls: Arc::new(CallCounts::default()),
        }
    }

    /// Register an empty route table
    pub async fn add_table(&self, table: &str) {
        let mut state = self.state.write().await;
        state.tables.entry(table.to_string()).or_default();
    }

    /// Seed a route, creating its table if needed
    pub async fn add_route(&self, route: Route) {
        let mut state = self.state.write().await;
        state
            .tables
            .entry(route.table_id.clone())
            .or_default()
            .push(route);
    }

    /// Make every create for this instance fail with a not-found error
    pub async fn mark_instance_gone(&self, provider_id: &str) {
        let mut state = self.state.write().await;
        state.gone_instances.insert(provider_id.to_string());
    }

    /// Queue errors returned by the next create calls, one per call
    pub async fn fail_next_creates(&self, errors: impl IntoIterator<Item = ProviderError>) {
        let mut state = self.state.write().await;
        state.create_failures.extend(errors);
    }

    /// Make every delete of this destination CIDR fail
    pub async fn fail_deletes_for(&self, cidr: &str) {
        let mut state = self.state.write().await;
        state.delete_failures.insert(cidr.to_string());
    }

    /// Make listing this table fail
    pub async fn fail_list_for(&self, table: &str) {
        let mut state = self.state.write().await;
        state.list_failures.insert(table.to_string());
    }

    /// Current routes of a table
    pub async fn routes(&self, table: &str) -> Vec<Route> {
        let state = self.state.read().await;
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.calls.delete.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.calls.find.load(Ordering::SeqCst)
    }
}

fn missing_table(table: &str) -> ProviderError {
    ProviderError::other(format!("InvalidRouteTableId: route table {} does not exist", table))
}

fn matches(route: &Route, provider_id: &str, cidr: &str) -> bool {
    (provider_id.is_empty() || route.provider_id == provider_id)
        && (cidr.is_empty() || route.destination_cidr == cidr)
}

#[async_trait]
impl VpcProvider for MemoryVpc {
    async fn list_route(&self, table: &str) -> ProviderResult<Vec<Route>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        if state.list_failures.contains(table) {
            return Err(ProviderError::transient(format!("list routes of {} timed out", table)));
        }
        state.tables.get(table).cloned().ok_or_else(|| missing_table(table))
    }

    async fn create_route(
        &self,
        table: &str,
        provider_id: &str,
        cidr: &str,
    ) -> ProviderResult<Route> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.gone_instances.contains(provider_id) {
            return Err(ProviderError::not_found(format!("instance {} not found", provider_id)));
        }
        if let Some(err) = state.create_failures.pop_front() {
            return Err(err);
        }

        let state = &mut *state;
        let routes = state.tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        if routes.iter().any(|r| r.destination_cidr == cidr) {
            return Err(ProviderError::other(format!(
                "RouteEntryConflict: destination {} already exists in {}",
                cidr, table
            )));
        }

        state.next_id += 1;
        let name = format!("route-{}-{}", table, state.next_id);
        let route = Route::new(table, cidr, provider_id).with_name(name);
        routes.push(route.clone());
        debug!("Created route {} -> {} in {}", cidr, provider_id, table);
        Ok(route)
    }

    async fn delete_route(
        &self,
        table: &str,
        provider_id: &str,
        cidr: &str,
    ) -> ProviderResult<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.delete_failures.contains(cidr) {
            return Err(ProviderError::transient(format!(
                "IncorrectRouteEntryStatus: route {} is busy",
                cidr
            )));
        }
        let routes = state.tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        routes.retain(|r| !(r.destination_cidr == cidr && matches(r, provider_id, "")));
        debug!("Deleted route {} from {}", cidr, table);
        Ok(())
    }

    async fn find_route(
        &self,
        table: &str,
        provider_id: &str,
        cidr: &str,
    ) -> ProviderResult<Option<Route>> {
        self.calls.find.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        let routes = state.tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(routes.iter().find(|r| matches(r, provider_id, cidr)).cloned())
    }

    async fn list_route_tables(&self, vpc_id: &str) -> ProviderResult<Vec<String>> {
        if vpc_id != self.vpc_id {
            return Ok(Vec::new());
        }
        let state = self.state.read().await;
        Ok(state.tables.keys().cloned().collect())
    }

    fn vpc_id(&self) -> ProviderResult<String> {
        Ok(self.vpc_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let vpc = MemoryVpc::new("vpc-1");
        vpc.add_table("rt-1").await;

        let route = vpc.create_route("rt-1", "i-a", "10.1.0.0/24").await.unwrap();
        assert_eq!(route.name, "route-rt-1-1");

        let found = vpc.find_route("rt-1", "i-a", "").await.unwrap();
        assert_eq!(found, Some(route));
        assert_eq!(vpc.find_route("rt-1", "i-b", "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_conflicting_destination() {
        let vpc = MemoryVpc::new("vpc-1");
        vpc.add_route(Route::new("rt-1", "10.1.0.0/24", "i-a")).await;

        let err = vpc.create_route("rt-1", "i-b", "10.1.0.0/24").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_gone_instance() {
        let vpc = MemoryVpc::new("vpc-1");
        vpc.add_table("rt-1").await;
        vpc.mark_instance_gone("i-a").await;

        let err = vpc.create_route("rt-1", "i-a", "10.1.0.0/24").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(vpc.routes("rt-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_is_not_classified_as_gone() {
        let vpc = MemoryVpc::new("vpc-1");
        let err = vpc.create_route("rt-x", "i-a", "10.1.0.0/24").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_route() {
        let vpc = MemoryVpc::new("vpc-1");
        vpc.add_route(Route::new("rt-1", "10.1.0.0/24", "i-a")).await;
        vpc.add_route(Route::new("rt-1", "10.2.0.0/24", "i-b")).await;

        vpc.delete_route("rt-1", "i-a", "10.1.0.0/24").await.unwrap();
        let routes = vpc.routes("rt-1").await;
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].destination_cidr, "10.2.0.0/24");
        assert_eq!(vpc.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_route_tables_by_vpc() {
        let vpc = MemoryVpc::new("vpc-1");
        vpc.add_table("rt-2").await;
        vpc.add_table("rt-1").await;

        assert_eq!(vpc.list_route_tables("vpc-1").await.unwrap(), vec!["rt-1", "rt-2"]);
        assert!(vpc.list_route_tables("vpc-2").await.unwrap().is_empty());
    }
}
