//! Property tests for the reassignment planner.
//!
//! Scenarios are generated by filling random buckets with random preference
//! lists, then planning one round. Checked properties:
//! - applying the planned moves never overfills any bucket;
//! - every move strictly improves the entity's preference position;
//! - at most one move per entity.

use std::collections::BTreeMap;

use adm_algo::{RankOrderPolicy, ReassignmentPolicy};
use adm_core::{Bucket, BucketId, BucketSet, Entity, EntityId};
use proptest::prelude::*;

fn bucket_id(i: usize) -> BucketId {
    format!("B{i}").parse().unwrap()
}

/// A generated scenario: bucket capacities plus per-entity preference lists
/// (indices into the bucket vector, distinct, in preference order).
#[derive(Clone, Debug)]
struct Scenario {
    capacities: Vec<u32>,
    preferences: Vec<Vec<usize>>,
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (2usize..=5).prop_flat_map(|nbuckets| {
        let caps = proptest::collection::vec(1u32..=3, nbuckets);
        let prefs = proptest::collection::vec(
            proptest::sample::subsequence((0..nbuckets).collect::<Vec<_>>(), 1..=nbuckets)
                .prop_shuffle(),
            1..=8,
        );
        (caps, prefs).prop_map(|(capacities, preferences)| Scenario {
            capacities,
            preferences,
        })
    })
}

/// Seat each entity at its *last* preference with real vacancy and mark it
/// Accepted (leaving earlier, better preferences open so upgrades exist);
/// entities that find no seat stay NotOffered (ineligible).
fn build(scn: &Scenario) -> (Vec<Entity>, BucketSet) {
    let mut buckets = BucketSet::new(
        scn.capacities
            .iter()
            .enumerate()
            .map(|(i, c)| Bucket::new(bucket_id(i), *c))
            .collect(),
    );

    let mut entities = Vec::new();
    for (i, prefs) in scn.preferences.iter().enumerate() {
        let id: EntityId = format!("S{i}").parse().unwrap();
        let pref_ids: Vec<BucketId> = prefs.iter().map(|&p| bucket_id(p)).collect();
        let mut e = Entity::new(id.clone(), (i as u32) + 1, pref_ids.clone());
        if let Some(seat) = pref_ids.iter().rev().find(|b| {
            buckets.get(b).map(|bk| bk.has_vacancy()).unwrap_or(false)
        }) {
            buckets.get_mut(seat).unwrap().assign(&id);
            e.offer(seat.clone());
            e.accept();
        }
        entities.push(e);
    }
    (entities, buckets)
}

proptest! {
    #[test]
    fn planned_moves_respect_capacity_and_preference_order(scn in scenario()) {
        let (entities, buckets) = build(&scn);
        let moves = RankOrderPolicy.plan(&entities, &buckets);

        // Apply to occupancy counters and check bounds.
        let mut occupancy: BTreeMap<&BucketId, i64> = buckets
            .iter()
            .map(|b| (b.id(), b.assigned_count() as i64))
            .collect();
        for m in &moves {
            *occupancy.get_mut(&m.from).unwrap() -= 1;
            *occupancy.get_mut(&m.to).unwrap() += 1;
        }
        for b in buckets.iter() {
            let occ = occupancy[b.id()];
            prop_assert!(occ >= 0);
            prop_assert!(occ <= b.capacity() as i64);
        }

        // Strict preference improvement, one move per entity.
        let mut seen = Vec::new();
        for m in &moves {
            prop_assert!(!seen.contains(&m.entity));
            seen.push(m.entity.clone());

            let e = entities.iter().find(|e| e.id() == &m.entity).unwrap();
            let cur = e.preference_position(&m.from).unwrap();
            let dst = e.preference_position(&m.to).unwrap();
            prop_assert!(dst < cur, "move must go strictly earlier in the list");
        }
    }

    #[test]
    fn plan_is_deterministic(scn in scenario()) {
        let (entities, buckets) = build(&scn);
        let a = RankOrderPolicy.plan(&entities, &buckets);
        let b = RankOrderPolicy.plan(&entities, &buckets);
        prop_assert_eq!(a, b);
    }
}
