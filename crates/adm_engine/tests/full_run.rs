//! End-to-end flows: admission scenarios and a combined
//! admission-then-migration run.

use adm_algo::{RankOrderPolicy, ThresholdPolicy};
use adm_core::{DrawRng, EntityId, GroupId, Ratio, ThresholdParams};
use adm_engine::{
    AcceptAll, AdmissionService, EngineError, MigrationEngine, MigrationSetup, RegistryBuilder,
};

fn gid(s: &str) -> GroupId {
    s.parse().unwrap()
}

fn eid(s: &str) -> EntityId {
    s.parse().unwrap()
}

fn threshold_policy(min_active: u32, num: u32, den: u32) -> Box<ThresholdPolicy> {
    Box::new(ThresholdPolicy::new(ThresholdParams {
        min_active_per_group: min_active,
        vacancy_threshold: if num == 0 {
            Ratio::ZERO
        } else {
            Ratio::new_checked(num, den).unwrap()
        },
    }))
}

#[test]
fn single_admission_activates_exactly_the_minimum() {
    // Group A has 3 resources of capacity 2; the second group is empty and
    // therefore never selected, so A is the deciding group for any seed.
    let mut b = RegistryBuilder::new();
    b.register_group(gid("A")).unwrap();
    b.add_resource(&gid("A"), "R1".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.add_resource(&gid("A"), "R2".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.add_resource(&gid("A"), "R3".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.register_group(gid("B")).unwrap();

    let mut svc = AdmissionService::new(
        b.build().unwrap(),
        threshold_policy(2, 1, 4),
        DrawRng::from_seed_u64(2024),
    );

    svc.admit(&eid("S1")).unwrap();

    let a = svc.registry().group(&gid("A")).unwrap();
    assert_eq!(a.active_count(), 2, "top-up to min_active_per_group only");
    let occupied: Vec<u32> = a.resources().iter().map(|r| r.occupied()).collect();
    assert_eq!(occupied.iter().sum::<u32>(), 1);
    assert_eq!(occupied.iter().filter(|&&o| o == 1).count(), 1);
}

#[test]
fn full_house_then_exhausted_across_groups() {
    let mut b = RegistryBuilder::new();
    b.register_group(gid("A")).unwrap();
    b.add_resource(&gid("A"), "R1".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.add_resource(&gid("A"), "R2".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.add_resource(&gid("A"), "R3".parse().unwrap(), "Building A", 2)
        .unwrap();
    b.register_group(gid("B")).unwrap();
    b.add_resource(&gid("B"), "R4".parse().unwrap(), "Building B", 2)
        .unwrap();
    b.add_resource(&gid("B"), "R5".parse().unwrap(), "Building B", 2)
        .unwrap();

    let mut svc = AdmissionService::new(
        b.build().unwrap(),
        threshold_policy(2, 1, 4),
        DrawRng::from_seed_u64(7),
    );

    let total = svc.registry().total_capacity();
    assert_eq!(total, 10);
    for i in 0..total {
        svc.admit(&eid(&format!("S{i}"))).expect("capacity remains");
    }
    assert_eq!(
        svc.admit(&eid("Overflow")),
        Err(EngineError::ResourceExhausted)
    );

    // Occupancy bound held throughout.
    for g in svc.registry().groups() {
        for r in g.resources() {
            assert_eq!(r.occupied(), r.capacity());
        }
    }
}

#[test]
fn same_seed_reproduces_the_admission_sequence() {
    let build = || {
        let mut b = RegistryBuilder::new();
        for g in ["A", "B", "C"] {
            b.register_group(gid(g)).unwrap();
            for r in 0..3 {
                b.add_resource(&gid(g), format!("{g}-R{r}").parse().unwrap(), g, 2)
                    .unwrap();
            }
        }
        AdmissionService::new(
            b.build().unwrap(),
            threshold_policy(1, 0, 1),
            DrawRng::from_seed_u64(99),
        )
    };

    let mut first = build();
    let mut second = build();
    for i in 0..18 {
        let e = eid(&format!("S{i}"));
        assert_eq!(first.admit(&e).unwrap(), second.admit(&e).unwrap());
    }
}

#[test]
fn admitted_entities_flow_into_migration() {
    // Admit ten applicants, then migrate the same ten across three buckets.
    let mut b = RegistryBuilder::new();
    b.register_group(gid("Main")).unwrap();
    b.add_resource(&gid("Main"), "R1".parse().unwrap(), "Hall", 10)
        .unwrap();
    let mut svc = AdmissionService::new(
        b.build().unwrap(),
        threshold_policy(1, 0, 1),
        DrawRng::from_seed_u64(1),
    );

    let mut setup = MigrationSetup::new();
    setup.register_bucket("CSE".parse().unwrap(), 4).unwrap();
    setup.register_bucket("EEE".parse().unwrap(), 3).unwrap();
    setup.register_bucket("ME".parse().unwrap(), 3).unwrap();

    for i in 0..10 {
        let e = eid(&format!("S{i}"));
        svc.admit(&e).unwrap();
        setup
            .register_entity(
                e,
                i + 1,
                vec![
                    "CSE".parse().unwrap(),
                    "EEE".parse().unwrap(),
                    "ME".parse().unwrap(),
                ],
            )
            .unwrap();
    }

    let (buckets, entities) = setup.build().unwrap();
    let mut engine = MigrationEngine::new(buckets, entities, Box::new(RankOrderPolicy));
    let allocation = engine.run(2, &mut AcceptAll);

    let seated: usize = allocation.buckets.values().map(Vec::len).sum();
    assert_eq!(seated, 10);
    for b in engine.buckets().iter() {
        assert!(b.assigned_count() <= b.capacity());
    }
    // Rank order fills the most-preferred bucket first.
    assert_eq!(
        allocation.buckets[&"CSE".parse().unwrap()],
        (0..4).map(|i| eid(&format!("S{i}"))).collect::<Vec<_>>()
    );
}
