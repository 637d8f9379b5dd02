//! Validated setup builders.
//!
//! Everything an invalid run could trip over is rejected here, before any
//! `admit` or migration round executes: zero capacities, duplicate ids,
//! unknown references, duplicate ranks, an empty registry.

use std::collections::BTreeSet;

use adm_core::{
    Bucket, BucketSet, Entity, EntityId, Group, GroupId, GroupRegistry, Resource, ResourceId,
};
use adm_core::{BucketId, determinism};

use crate::EngineError;

/// Builder for the admission-side group/resource registry.
///
/// Groups and resources keep their registration order; no dynamic add is
/// possible once `build` has produced the registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    groups: Vec<Group>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_group(&mut self, id: GroupId) -> Result<&mut Self, EngineError> {
        if self.groups.iter().any(|g| g.id() == &id) {
            return Err(EngineError::InvalidConfiguration(format!(
                "duplicate group id: {id}"
            )));
        }
        self.groups.push(Group::new(id));
        Ok(self)
    }

    pub fn add_resource(
        &mut self,
        group: &GroupId,
        id: ResourceId,
        location: impl Into<String>,
        capacity: u32,
    ) -> Result<&mut Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "resource {id} has capacity 0"
            )));
        }
        if self
            .groups
            .iter()
            .any(|g| g.resources().iter().any(|r| r.id() == &id))
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "duplicate resource id: {id}"
            )));
        }
        let target = self
            .groups
            .iter_mut()
            .find(|g| g.id() == group)
            .ok_or_else(|| {
                EngineError::InvalidConfiguration(format!("unknown group: {group}"))
            })?;
        target.push_resource(Resource::new(id, location, capacity));
        Ok(self)
    }

    /// An empty registry cannot admit anyone and is rejected outright.
    /// Groups with zero resources are allowed; they are simply never
    /// selected by the policy.
    pub fn build(self) -> Result<GroupRegistry, EngineError> {
        if self.groups.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "group registry is empty".to_string(),
            ));
        }
        Ok(GroupRegistry::new(self.groups))
    }
}

/// Builder for the migration-side buckets and entities.
#[derive(Debug, Default)]
pub struct MigrationSetup {
    buckets: Vec<Bucket>,
    entities: Vec<Entity>,
}

impl MigrationSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_bucket(&mut self, id: BucketId, capacity: u32) -> Result<&mut Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "bucket {id} has capacity 0"
            )));
        }
        if self.buckets.iter().any(|b| b.id() == &id) {
            return Err(EngineError::InvalidConfiguration(format!(
                "duplicate bucket id: {id}"
            )));
        }
        self.buckets.push(Bucket::new(id, capacity));
        Ok(self)
    }

    pub fn register_entity(
        &mut self,
        id: EntityId,
        rank: u32,
        preferences: Vec<BucketId>,
    ) -> Result<&mut Self, EngineError> {
        if self.entities.iter().any(|e| e.id() == &id) {
            return Err(EngineError::InvalidConfiguration(format!(
                "duplicate entity id: {id}"
            )));
        }
        if self.entities.iter().any(|e| e.rank() == rank) {
            return Err(EngineError::InvalidConfiguration(format!(
                "duplicate rank {rank} (entity {id})"
            )));
        }
        if preferences.is_empty() {
            return Err(EngineError::InvalidConfiguration(format!(
                "entity {id} has an empty preference list"
            )));
        }
        let mut seen = BTreeSet::new();
        for pref in &preferences {
            if !seen.insert(pref.clone()) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "entity {id} lists bucket {pref} twice"
                )));
            }
        }
        self.entities.push(Entity::new(id, rank, preferences));
        Ok(self)
    }

    /// Validate cross-references and hand the collections to the engine:
    /// every preference must name a registered bucket.
    pub fn build(self) -> Result<(BucketSet, Vec<Entity>), EngineError> {
        let buckets = BucketSet::new(self.buckets);
        for e in &self.entities {
            for pref in e.preferences() {
                if !buckets.contains(pref) {
                    return Err(EngineError::InvalidConfiguration(format!(
                        "entity {} prefers unknown bucket {pref}",
                        e.id()
                    )));
                }
            }
        }
        let mut entities = self.entities;
        determinism::sort_by_rank(&mut entities);
        Ok((buckets, entities))
    }
}
