//! Migration engine: the round state machine.
//!
//! One round:
//! 1. Plan upgrade moves (reassignment policy) and apply them in the order
//!    produced (ascending rank); each moved entity gets a lock prompt.
//! 2. Offer every NotOffered entity its first preference with real vacancy.
//! 3. Decision pass in rank order: Offered entities accept (with an
//!    immediate lock follow-up) or decline; entities already Accepted and
//!    not Locked get a lock prompt.
//!
//! The engine stops after the caller-supplied number of rounds; there is no
//! convergence detection. A round with zero moves or zero vacancies is
//! normal and silent. All iteration is rank-ordered and deterministic;
//! randomization exists only on the admission side.

use adm_algo::ReassignmentPolicy;
use adm_core::{BucketSet, Entity, MigrationStatus};

use crate::decisions::{Decision, DecisionProvider, LockDecision};
use crate::snapshot::{membership, FinalAllocation, RoundSnapshot};

pub struct MigrationEngine {
    buckets: BucketSet,
    /// Sorted by rank at construction (see `MigrationSetup::build`).
    entities: Vec<Entity>,
    policy: Box<dyn ReassignmentPolicy>,
    snapshots: Vec<RoundSnapshot>,
    rounds_run: u32,
}

impl core::fmt::Debug for MigrationEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("buckets", &self.buckets)
            .field("entities", &self.entities)
            .field("snapshots", &self.snapshots)
            .field("rounds_run", &self.rounds_run)
            .finish_non_exhaustive()
    }
}

impl MigrationEngine {
    pub fn new(
        buckets: BucketSet,
        entities: Vec<Entity>,
        policy: Box<dyn ReassignmentPolicy>,
    ) -> Self {
        MigrationEngine {
            buckets,
            entities,
            policy,
            snapshots: Vec::new(),
            rounds_run: 0,
        }
    }

    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Per-round membership snapshots collected so far.
    pub fn snapshots(&self) -> &[RoundSnapshot] {
        &self.snapshots
    }

    /// Run `rounds` rounds and read the terminal allocation off the final
    /// state. May be called again to continue with more rounds.
    pub fn run(&mut self, rounds: u32, provider: &mut dyn DecisionProvider) -> FinalAllocation {
        for _ in 0..rounds {
            self.run_round(provider);
        }
        self.final_allocation()
    }

    /// The terminal allocation view (every bucket listed, rank order).
    pub fn final_allocation(&self) -> FinalAllocation {
        FinalAllocation::with_all_buckets(&self.entities, self.buckets.iter().map(|b| b.id()))
    }

    /// One discrete round.
    pub fn run_round(&mut self, provider: &mut dyn DecisionProvider) {
        self.rounds_run += 1;

        self.apply_moves(provider);
        self.offer_unassigned();
        self.decision_pass(provider);

        self.snapshots.push(RoundSnapshot {
            round: self.rounds_run,
            buckets: membership(&self.entities),
        });
        self.assert_consistency();
    }

    /// Step 1: apply planned upgrades, prompting each mover for a lock.
    fn apply_moves(&mut self, provider: &mut dyn DecisionProvider) {
        let moves = self.policy.plan(&self.entities, &self.buckets);
        for mv in moves {
            let entity = self
                .entities
                .iter_mut()
                .find(|e| e.id() == &mv.entity)
                .expect("planned move references a registered entity");

            if let Some(origin) = self.buckets.get_mut(&mv.from) {
                origin.remove(entity.id());
            }
            self.buckets
                .get_mut(&mv.to)
                .expect("planned move targets a registered bucket")
                .assign(entity.id());
            entity.reassign(mv.to.clone());

            if provider.lock(&mv.entity, &mv.to) == LockDecision::Lock {
                entity.lock();
            }
        }
    }

    /// Step 2: every NotOffered entity takes the first preference with real
    /// vacancy; no vacancy anywhere leaves it NotOffered for a later round.
    fn offer_unassigned(&mut self) {
        for entity in &mut self.entities {
            if entity.status() != MigrationStatus::NotOffered {
                continue;
            }
            let target = entity
                .preferences()
                .iter()
                .find(|p| {
                    self.buckets
                        .get(p)
                        .map(|b| b.has_vacancy())
                        .unwrap_or(false)
                })
                .cloned();
            if let Some(bucket_id) = target {
                self.buckets
                    .get_mut(&bucket_id)
                    .expect("preference targets are validated at setup")
                    .assign(entity.id());
                entity.offer(bucket_id);
            }
        }
    }

    /// Step 3: one rank-ordered pass. Offered entities decide on their
    /// offer (accepting triggers an immediate lock follow-up); entities
    /// already Accepted and unlocked get a lock prompt.
    fn decision_pass(&mut self, provider: &mut dyn DecisionProvider) {
        for entity in &mut self.entities {
            match entity.status() {
                MigrationStatus::Offered => {
                    let bucket = entity
                        .current_bucket()
                        .expect("offered entity holds a bucket")
                        .clone();
                    match provider.offer(entity.id(), &bucket) {
                        Decision::Accept => {
                            entity.accept();
                            if provider.lock(entity.id(), &bucket) == LockDecision::Lock {
                                entity.lock();
                            }
                        }
                        Decision::Decline => {
                            self.buckets
                                .get_mut(&bucket)
                                .expect("current bucket is registered")
                                .remove(entity.id());
                            entity.decline();
                        }
                    }
                }
                MigrationStatus::Accepted => {
                    let bucket = entity
                        .current_bucket()
                        .expect("accepted entity holds a bucket")
                        .clone();
                    if provider.lock(entity.id(), &bucket) == LockDecision::Lock {
                        entity.lock();
                    }
                }
                MigrationStatus::NotOffered
                | MigrationStatus::Declined
                | MigrationStatus::Locked => {}
            }
        }
    }

    /// Bucket vectors and entity state must describe the same membership.
    fn assert_consistency(&self) {
        if cfg!(debug_assertions) {
            let members = membership(&self.entities);
            for b in self.buckets.iter() {
                let expected = members.get(b.id()).map(Vec::len).unwrap_or(0);
                debug_assert_eq!(
                    b.assigned().len(),
                    expected,
                    "bucket {} out of sync with entity state",
                    b.id()
                );
                debug_assert!(b.assigned_count() <= b.capacity());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisions::{AcceptAll, DeclineAll, ScriptedDecisions};
    use crate::setup::MigrationSetup;
    use adm_algo::RankOrderPolicy;
    use adm_core::{BucketId, EntityId};

    fn bid(s: &str) -> BucketId {
        s.parse().unwrap()
    }

    fn eid(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    /// Buckets CSE:1, EEE:1, ME:1 and the S1/S2/S3 rank ladder.
    fn three_department_engine() -> MigrationEngine {
        let mut s = MigrationSetup::new();
        s.register_bucket(bid("CSE"), 1).unwrap();
        s.register_bucket(bid("EEE"), 1).unwrap();
        s.register_bucket(bid("ME"), 1).unwrap();
        s.register_entity(eid("S1"), 1, vec![bid("CSE"), bid("EEE"), bid("ME")])
            .unwrap();
        s.register_entity(eid("S2"), 2, vec![bid("ME"), bid("EEE")])
            .unwrap();
        s.register_entity(eid("S3"), 3, vec![bid("CSE"), bid("EEE")])
            .unwrap();
        let (buckets, entities) = s.build().unwrap();
        MigrationEngine::new(buckets, entities, Box::new(RankOrderPolicy))
    }

    #[test]
    fn first_round_all_accept_assigns_by_rank_and_preference() {
        let mut engine = three_department_engine();
        let allocation = engine.run(1, &mut AcceptAll);

        assert_eq!(allocation.buckets[&bid("CSE")], vec![eid("S1")]);
        assert_eq!(allocation.buckets[&bid("ME")], vec![eid("S2")]);
        assert_eq!(allocation.buckets[&bid("EEE")], vec![eid("S3")]);
        for e in engine.entities() {
            assert_eq!(e.status(), MigrationStatus::Accepted);
        }
    }

    #[test]
    fn declining_everything_empties_all_buckets() {
        let mut engine = three_department_engine();
        let allocation = engine.run(3, &mut DeclineAll);

        for (_, members) in &allocation.buckets {
            assert!(members.is_empty());
        }
        for e in engine.entities() {
            assert_eq!(e.status(), MigrationStatus::Declined);
            assert!(e.current_bucket().is_none());
        }
    }

    #[test]
    fn declined_seat_is_reoffered_next_round() {
        // Round 1: S1 declines CSE; S3 (also wanting CSE) got EEE.
        // Round 2: S3 is Accepted in EEE and upgrades into the freed CSE.
        let mut engine = three_department_engine();
        let mut decisions = ScriptedDecisions::from_pairs(
            [
                (eid("S1"), vec![false]),            // decline CSE
                (eid("S2"), vec![true, false]),      // accept ME, no lock
                (eid("S3"), vec![true, false]),      // accept EEE, no lock
            ],
            true, // everything later: accept/lock
        );
        engine.run(2, &mut decisions);

        let s3 = engine.entities().iter().find(|e| e.id() == &eid("S3")).unwrap();
        assert_eq!(s3.current_bucket(), Some(&bid("CSE")));
        assert_eq!(s3.status(), MigrationStatus::Locked); // default=true locks it
        let s1 = engine.entities().iter().find(|e| e.id() == &eid("S1")).unwrap();
        assert_eq!(s1.status(), MigrationStatus::Declined);
    }

    #[test]
    fn locked_entity_never_moves_again() {
        let mut engine = three_department_engine();
        // Everyone accepts and locks in round 1.
        let mut all_yes = ScriptedDecisions::from_pairs([], true);
        engine.run(1, &mut all_yes);
        let before: Vec<_> = engine
            .entities()
            .iter()
            .map(|e| (e.status(), e.current_bucket().cloned()))
            .collect();

        engine.run(5, &mut all_yes);
        let after: Vec<_> = engine
            .entities()
            .iter()
            .map(|e| (e.status(), e.current_bucket().cloned()))
            .collect();
        assert_eq!(before, after);
        assert!(engine.entities().iter().all(Entity::is_locked));
    }

    #[test]
    fn overfull_field_leaves_lowest_priority_unassigned() {
        // Two seats, three entities wanting the same bucket: the highest
        // ranks get seats, the lowest stays NotOffered round after round.
        let mut s = MigrationSetup::new();
        s.register_bucket(bid("CSE"), 2).unwrap();
        for (id, rank) in [("S1", 1), ("S2", 2), ("S3", 3)] {
            s.register_entity(eid(id), rank, vec![bid("CSE")]).unwrap();
        }
        let (buckets, entities) = s.build().unwrap();
        let mut engine = MigrationEngine::new(buckets, entities, Box::new(RankOrderPolicy));
        let allocation = engine.run(3, &mut AcceptAll);

        assert_eq!(allocation.buckets[&bid("CSE")], vec![eid("S1"), eid("S2")]);
        let s3 = engine.entities().iter().find(|e| e.id() == &eid("S3")).unwrap();
        assert_eq!(s3.status(), MigrationStatus::NotOffered);
        assert!(s3.current_bucket().is_none());
    }

    #[test]
    fn snapshots_record_every_round() {
        let mut engine = three_department_engine();
        engine.run(3, &mut AcceptAll);
        let rounds: Vec<u32> = engine.snapshots().iter().map(|s| s.round).collect();
        assert_eq!(rounds, vec![1, 2, 3]);
        // Stable from round 1 onward: everyone accepted immediately.
        assert_eq!(engine.snapshots()[0].buckets, engine.snapshots()[2].buckets);
    }

    #[test]
    fn final_allocation_matches_entity_state_rederivation() {
        let mut engine = three_department_engine();
        let allocation = engine.run(2, &mut AcceptAll);
        let rederived = FinalAllocation::from_entities(engine.entities());
        for (bucket, members) in &rederived.buckets {
            assert_eq!(&allocation.buckets[bucket], members);
        }
    }
}
