use route_core::RouteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KubeError>;

#[derive(Error, Debug)]
pub enum KubeError {
    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),
}

impl From<KubeError> for RouteError {
    fn from(err: KubeError) -> Self {
        RouteError::Cluster(err.to_string())
    }
}
