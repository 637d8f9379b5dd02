//! Admission service: one policy call plus one occupancy mutation per
//! applicant.
//!
//! The service instance is constructed and owned by the caller for the
//! duration of one allocation run. Access must be serialized; the reference
//! design assumes exactly one caller thread.

use adm_algo::{AdmissionPolicy, SelectError};
use adm_core::{DrawRng, EntityId, GroupId, GroupRegistry, ResourceId};

use crate::EngineError;

/// Outcome of one successful admission.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Admission {
    pub entity: EntityId,
    pub resource: ResourceId,
    pub group: GroupId,
    /// Free-form label of the resource (reporting only, never decisional).
    pub location: String,
}

/// Orchestrates policy selection and occupancy mutation.
pub struct AdmissionService {
    registry: GroupRegistry,
    policy: Box<dyn AdmissionPolicy>,
    rng: DrawRng,
}

impl AdmissionService {
    pub fn new(registry: GroupRegistry, policy: Box<dyn AdmissionPolicy>, rng: DrawRng) -> Self {
        AdmissionService {
            registry,
            policy,
            rng,
        }
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Admit one applicant: ask the policy for a target resource, then
    /// occupy one seat there.
    ///
    /// `ResourceExhausted` is the normal failure once all seats are taken;
    /// `CapacityExceeded` means the policy returned a full resource and is
    /// an invariant breach.
    pub fn admit(&mut self, entity: &EntityId) -> Result<Admission, EngineError> {
        let selection = self
            .policy
            .select(&mut self.registry, &mut self.rng)
            .map_err(|SelectError::ResourceExhausted| EngineError::ResourceExhausted)?;

        let group = self
            .registry
            .group_mut(&selection.group)
            .ok_or_else(|| {
                EngineError::CapacityExceeded(format!(
                    "policy selected unknown group {}",
                    selection.group
                ))
            })?;
        let resource = group.resource_mut(&selection.resource).ok_or_else(|| {
            EngineError::CapacityExceeded(format!(
                "policy selected unknown resource {}",
                selection.resource
            ))
        })?;

        resource.occupy().map_err(|_| {
            EngineError::CapacityExceeded(format!(
                "resource {} already at capacity {}",
                selection.resource,
                resource.capacity()
            ))
        })?;
        let location = resource.location().to_string();

        Ok(Admission {
            entity: entity.clone(),
            resource: selection.resource,
            group: selection.group,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adm_algo::ThresholdPolicy;
    use adm_core::{Ratio, ThresholdParams};
    use crate::setup::RegistryBuilder;

    fn service(threshold: Ratio, min_active: u32) -> AdmissionService {
        let mut b = RegistryBuilder::new();
        b.register_group("A".parse().unwrap()).unwrap();
        b.add_resource(&"A".parse().unwrap(), "R1".parse().unwrap(), "Hall-1", 2)
            .unwrap();
        b.add_resource(&"A".parse().unwrap(), "R2".parse().unwrap(), "Hall-1", 2)
            .unwrap();
        b.register_group("B".parse().unwrap()).unwrap();
        b.add_resource(&"B".parse().unwrap(), "R3".parse().unwrap(), "Hall-2", 2)
            .unwrap();
        let registry = b.build().unwrap();
        AdmissionService::new(
            registry,
            Box::new(ThresholdPolicy::new(ThresholdParams {
                min_active_per_group: min_active,
                vacancy_threshold: threshold,
            })),
            DrawRng::from_seed_u64(77),
        )
    }

    #[test]
    fn admits_exactly_total_capacity_then_exhausts() {
        let mut svc = service(Ratio::ZERO, 1);
        let total = svc.registry().total_capacity();
        for i in 0..total {
            let entity: EntityId = format!("S{i}").parse().unwrap();
            let adm = svc.admit(&entity).expect("seat must be found");
            assert_eq!(adm.entity, entity);
        }
        assert_eq!(svc.registry().total_occupied(), total);
        assert_eq!(
            svc.admit(&"Overflow".parse().unwrap()),
            Err(EngineError::ResourceExhausted)
        );
    }

    #[test]
    fn occupancy_never_exceeds_capacity() {
        let mut svc = service(Ratio::ZERO, 2);
        while svc.admit(&"S".parse().unwrap()).is_ok() {}
        for g in svc.registry().groups() {
            for r in g.resources() {
                assert!(r.occupied() <= r.capacity());
            }
        }
    }

    #[test]
    fn admission_reports_location() {
        let mut svc = service(Ratio::new_checked(1, 4).unwrap(), 1);
        let adm = svc.admit(&"S1".parse().unwrap()).unwrap();
        assert!(adm.location.starts_with("Hall-"));
    }
}
