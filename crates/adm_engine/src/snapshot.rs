//! Read-only views of bucket membership.
//!
//! Member lists are ordered by ascending entity rank, derived from entity
//! state. That makes the per-round snapshot, the final allocation, and a
//! re-derivation from entity states agree exactly.

use std::collections::BTreeMap;

use adm_core::{BucketId, Entity, EntityId, MigrationStatus};

/// Membership after one round, usable for logging.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSnapshot {
    pub round: u32,
    pub buckets: BTreeMap<BucketId, Vec<EntityId>>,
}

/// Terminal allocation: bucket → members in rank order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FinalAllocation {
    pub buckets: BTreeMap<BucketId, Vec<EntityId>>,
}

/// Group entities holding a bucket (Offered/Accepted/Locked) by that bucket.
/// `entities` must already be in rank order; membership order follows it.
pub(crate) fn membership(entities: &[Entity]) -> BTreeMap<BucketId, Vec<EntityId>> {
    let mut out: BTreeMap<BucketId, Vec<EntityId>> = BTreeMap::new();
    for e in entities {
        debug_assert_eq!(
            e.current_bucket().is_some(),
            matches!(
                e.status(),
                MigrationStatus::Offered | MigrationStatus::Accepted | MigrationStatus::Locked
            ),
        );
        if let Some(bucket) = e.current_bucket() {
            out.entry(bucket.clone()).or_default().push(e.id().clone());
        }
    }
    out
}

impl FinalAllocation {
    /// Re-derive the allocation from entity states. Empty buckets are not
    /// listed; callers wanting every bucket key use `with_all_buckets`.
    pub fn from_entities(entities: &[Entity]) -> Self {
        FinalAllocation {
            buckets: membership(entities),
        }
    }

    /// Same, but with an entry (possibly empty) for every bucket id given.
    pub fn with_all_buckets<'a>(
        entities: &[Entity],
        bucket_ids: impl Iterator<Item = &'a BucketId>,
    ) -> Self {
        let mut buckets = membership(entities);
        for id in bucket_ids {
            buckets.entry(id.clone()).or_default();
        }
        FinalAllocation { buckets }
    }
}
