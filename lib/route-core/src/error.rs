use crate::provider::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("ignoring route {0}, unparsable CIDR")]
    Parse(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("multiple route tables found by vpc id[{vpc_id}], length(tables)={count}")]
    AmbiguousTable { vpc_id: String, count: usize },

    #[error("no route tables found by vpc id[{0}]")]
    NoTable(String),

    #[error("empty query condition")]
    InvalidQuery,

    #[error("error create route for node {provider_id}, err: {source}")]
    CreateExhausted {
        provider_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cluster state error: {0}")]
    Cluster(String),

    #[error("{0} timed out")]
    Timeout(String),
}
