//! CIDR containment checks
//!
//! One predicate serves two callers. Scope filtering reads the loose half of
//! [`Containment`], where a route equal to the scope network still counts.
//! Conflict detection reads the strict half, where it does not. This is the
//! self-match rule: a candidate whose text equals the outer network is in
//! scope but not strictly contained.

use crate::{Result, RouteError};
use ipnetwork::{IpNetwork, Ipv4Network};

/// Result of testing a candidate prefix against an outer network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Containment {
    /// Candidate lies within the outer network, equality included
    pub in_scope: bool,
    /// Candidate lies properly inside the outer network, equality excluded
    pub strictly_contained: bool,
}

impl Containment {
    const ALL: Containment = Containment {
        in_scope: true,
        strictly_contained: true,
    };
    const SELF_MATCH: Containment = Containment {
        in_scope: true,
        strictly_contained: false,
    };
    const OUTSIDE: Containment = Containment {
        in_scope: false,
        strictly_contained: false,
    };
}

/// Classify `candidate` against `outside`
///
/// No outer network matches everything. An unparsable candidate is an error
/// regardless of `outside`.
pub fn classify(outside: Option<&Ipv4Network>, candidate: &str) -> Result<Containment> {
    let Some(outside) = outside else {
        return Ok(Containment::ALL);
    };

    let parsed = parse_cidr(candidate)?;

    if outside.to_string() == candidate {
        return Ok(Containment::SELF_MATCH);
    }

    let IpNetwork::V4(inside) = parsed else {
        return Ok(Containment::OUTSIDE);
    };
    if !outside.contains(inside.network()) || !outside.contains(inside.broadcast()) {
        return Ok(Containment::OUTSIDE);
    }
    Ok(Containment::ALL)
}

/// Parse CIDR text; a bare address without a prefix length is rejected
pub fn parse_cidr(text: &str) -> Result<IpNetwork> {
    if !text.contains('/') {
        return Err(RouteError::Parse(text.to_string()));
    }
    text.parse::<IpNetwork>()
        .map_err(|_| RouteError::Parse(text.to_string()))
}

/// Parse the cluster scope CIDR; empty means no scope
pub fn parse_scope(text: Option<&str>) -> Result<Option<Ipv4Network>> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match parse_cidr(text)? {
            IpNetwork::V4(net) => Ok(Some(route_api::node::normalize(net))),
            IpNetwork::V6(_) => Err(RouteError::Config(format!(
                "cluster cidr {} is not an IPv4 network",
                text
            ))),
        },
    }
}
