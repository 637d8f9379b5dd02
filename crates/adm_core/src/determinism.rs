//! Stable ordering helpers.
//!
//! Randomization is confined to the admission policy; every migration-side
//! iteration uses ascending entity rank, with the id as a defensive tiebreak
//! (setup rejects duplicate ranks, so the tiebreak never fires in practice).

use core::cmp::Ordering;

use crate::entities::Entity;
use crate::tokens::BucketId;

/// Compare entities by rank, then id.
pub fn cmp_by_rank(a: &Entity, b: &Entity) -> Ordering {
    match a.rank().cmp(&b.rank()) {
        Ordering::Equal => a.id().as_str().cmp(b.id().as_str()),
        o => o,
    }
}

/// Sort entities ascending by rank (lowest rank = highest priority).
pub fn sort_by_rank(entities: &mut [Entity]) {
    entities.sort_by(cmp_by_rank);
}

/// Sort bucket ids ascending (lexicographic).
pub fn sort_bucket_ids(ids: &mut [BucketId]) {
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::EntityId;

    fn ent(id: &str, rank: u32) -> Entity {
        Entity::new(id.parse::<EntityId>().unwrap(), rank, Vec::new())
    }

    #[test]
    fn rank_order_is_ascending() {
        let mut es = vec![ent("S3", 3), ent("S1", 1), ent("S2", 2)];
        sort_by_rank(&mut es);
        let ids: Vec<&str> = es.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }
}
