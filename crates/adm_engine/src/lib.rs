//! adm_engine — orchestration of admission and migration.
//!
//! Stages: setup (validated builders) → admit (one call per applicant) →
//! migrate (fixed number of rounds over the bucket/entity state machine).
//! This crate is I/O-free; scenario parsing and report emission live in
//! `adm_io`, randomness comes from `adm_core::rng`, and the decision logic
//! is delegated to `adm_algo` policies.
//!
//! All state is caller-owned: construct an [`AdmissionService`] or
//! [`MigrationEngine`] and drive it from exactly one thread. There is no
//! global instance and no hidden static state.

#![forbid(unsafe_code)]

use core::fmt;

pub mod admit;
pub mod decisions;
pub mod migrate;
pub mod setup;
pub mod snapshot;

pub use admit::{Admission, AdmissionService};
pub use decisions::{AcceptAll, DeclineAll, Decision, DecisionProvider, LockDecision, ScriptedDecisions};
pub use migrate::MigrationEngine;
pub use setup::{MigrationSetup, RegistryBuilder};
pub use snapshot::{FinalAllocation, RoundSnapshot};

/// Single error surface for engine orchestration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Admission found no admissible resource across all groups. Normal;
    /// the caller decides whether to retry after adding capacity.
    ResourceExhausted,
    /// Occupancy would exceed capacity — an invariant breach, fatal to the
    /// call. Never occurs while the policy holds its contract.
    CapacityExceeded(String),
    /// Rejected at setup time; never discovered mid-round.
    InvalidConfiguration(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ResourceExhausted => {
                write!(f, "no admissible resource in any group")
            }
            EngineError::CapacityExceeded(what) => {
                write!(f, "capacity exceeded: {what}")
            }
            EngineError::InvalidConfiguration(why) => {
                write!(f, "invalid configuration: {why}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
