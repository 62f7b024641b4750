//! Network-subsystem error type.

use thiserror::Error;

use st_core::{NodeId, StreetId};

/// Errors produced by `st-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    UnknownNode(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("street {origin} -> {destination} already exists")]
    DuplicateStreet { origin: NodeId, destination: NodeId },

    #[error("street {0} not found in network")]
    UnknownStreet(StreetId),

    #[error("invalid street {origin} -> {destination}: {reason}")]
    InvalidStreet {
        origin:      NodeId,
        destination: NodeId,
        reason:      String,
    },

    #[error("driving time of {street} must be positive and finite, got {value}")]
    InvalidDrivingTime { street: StreetId, value: f64 },

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
