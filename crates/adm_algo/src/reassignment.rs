//! Rank-ordered reassignment policy.
//!
//! One pass over the eligible entities (Accepted, not Locked) in strictly
//! ascending rank order — the fairness guarantee. For each entity the
//! preference list is scanned in order and the scan **stops at the entry
//! equal to the current bucket**: preferences at or past the held position
//! are never considered. The first earlier entry with positive *simulated*
//! vacancy yields the move.
//!
//! Vacancy is simulated with per-bucket counters seeded from real vacancy
//! and adjusted −1 destination / +1 freed origin as moves are accepted, so
//! several entities can chain through the same seat in one round without
//! double-booking. At most one move per entity per round.

use std::collections::BTreeMap;

use adm_core::{BucketId, BucketSet, Entity};

use crate::{Move, ReassignmentPolicy};

/// The rank-priority strategy (the only shipped reassignment policy).
#[derive(Clone, Copy, Debug, Default)]
pub struct RankOrderPolicy;

impl ReassignmentPolicy for RankOrderPolicy {
    fn plan(&self, entities: &[Entity], buckets: &BucketSet) -> Vec<Move> {
        let mut vacancy: BTreeMap<&BucketId, i64> = buckets
            .iter()
            .map(|b| (b.id(), b.vacancy() as i64))
            .collect();

        // Callers hand entities over pre-sorted by rank; re-derive the order
        // here so the plan is correct for arbitrary input order too.
        let mut order: Vec<&Entity> = entities.iter().filter(|e| e.is_movable()).collect();
        order.sort_by(|a, b| adm_core::determinism::cmp_by_rank(a, b));

        let mut moves = Vec::new();
        for entity in order {
            let current = match entity.current_bucket() {
                Some(c) => c,
                // Accepted implies a bucket; skip defensively if violated.
                None => continue,
            };

            for pref in entity.preferences() {
                if pref == current {
                    break;
                }
                let free = vacancy.get(pref).copied().unwrap_or(0);
                if free > 0 {
                    *vacancy.get_mut(pref).expect("seeded above") -= 1;
                    if let Some(slot) = vacancy.get_mut(current) {
                        *slot += 1;
                    }
                    moves.push(Move {
                        entity: entity.id().clone(),
                        from: current.clone(),
                        to: pref.clone(),
                    });
                    break;
                }
            }
        }

        moves
    }
}
