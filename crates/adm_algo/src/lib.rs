//! adm_algo — policy layer for the admission/migration engine.
//!
//! Two strategy seams, one method each:
//! - [`AdmissionPolicy`]: pick the next resource to fill (may activate
//!   resources as a sticky side effect).
//! - [`ReassignmentPolicy`]: plan one round of upgrade moves over the
//!   current entity/bucket state.
//!
//! The threshold-based admission policy and the rank-ordered reassignment
//! policy are the only shipped strategies; the traits keep the contract
//! swappable.

#![forbid(unsafe_code)]

use adm_core::{
    BucketId, BucketSet, DrawRng, Entity, EntityId, GroupId, GroupRegistry, ResourceId,
};

// File modules (actual implementations)
pub mod admission;
pub mod reassignment;

pub use admission::{SelectError, ThresholdPolicy};
pub use reassignment::RankOrderPolicy;

/// The resource chosen to receive the next applicant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    pub group: GroupId,
    pub resource: ResourceId,
}

/// One planned upgrade: `entity` leaves `from` for the more-preferred `to`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Move {
    pub entity: EntityId,
    pub from: BucketId,
    pub to: BucketId,
}

/// Decision function for admission. Activation flips performed while
/// selecting are persisted on the registry even when the group is skipped.
pub trait AdmissionPolicy {
    fn select(
        &self,
        registry: &mut GroupRegistry,
        rng: &mut DrawRng,
    ) -> Result<Selection, SelectError>;
}

/// Decision function for one reassignment round. Pure: inspects state and
/// returns the batch of moves; the caller applies them in the order produced.
pub trait ReassignmentPolicy {
    fn plan(&self, entities: &[Entity], buckets: &BucketSet) -> Vec<Move>;
}
