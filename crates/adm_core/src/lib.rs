//! adm_core — Core types, domain entities, and deterministic RNG.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`adm_algo`, `adm_engine`, `adm_io`, `adm_cli`):
//!
//! - Registry tokens: `GroupId`, `ResourceId`, `BucketId`, `EntityId`
//! - Domain entities: `Resource`, `Group`, `GroupRegistry`, `Bucket`,
//!   `BucketSet`, `Entity`, `MigrationStatus`
//! - Parameter domains: `Ratio`, `ThresholdParams`
//! - Deterministic ordering helpers
//! - Seedable RNG (ChaCha20) for admission draws **only**
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        InvalidRatio,
        /// Occupancy increment against a resource already at capacity.
        CapacityExceeded,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidRatio => write!(f, "invalid ratio"),
                CoreError::CapacityExceeded => write!(f, "capacity exceeded"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod tokens;
pub mod entities;
pub mod params;
pub mod determinism;
pub mod rng;

pub use entities::{
    Bucket, BucketSet, Entity, Group, GroupRegistry, MigrationStatus, Resource,
};
pub use errors::CoreError;
pub use params::{Ratio, ThresholdParams};
pub use rng::DrawRng;
pub use tokens::{BucketId, EntityId, GroupId, ResourceId};
