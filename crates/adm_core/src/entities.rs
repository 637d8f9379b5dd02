//! Domain entities for admission (Resource/Group) and migration
//! (Bucket/Entity).
//!
//! Invariants are enforced at the type boundary:
//! - `Resource`: `occupied <= capacity`, capacity immutable, activation flips
//!   false→true only, occupancy only increases.
//! - `Bucket`: `assigned.len() <= capacity`, no duplicate members; assigning
//!   at capacity is a silent no-op (callers check vacancy first).
//! - `Entity`: `current_bucket` is `Some` iff status is Offered, Accepted,
//!   or Locked.
//!
//! Capacities are validated (≥ 1) by the setup builders in `adm_engine`;
//! constructors here trust their inputs.

use crate::errors::CoreError;
use crate::params::Ratio;
use crate::tokens::{BucketId, EntityId, GroupId, ResourceId};

/// A capacity-bounded admission unit within a group.
#[derive(Clone, Debug)]
pub struct Resource {
    id: ResourceId,
    location: String,
    capacity: u32,
    occupied: u32,
    active: bool,
}

impl Resource {
    /// Resources start inactive and empty. `capacity` must be ≥ 1
    /// (enforced by the registry builder).
    pub fn new(id: ResourceId, location: impl Into<String>, capacity: u32) -> Self {
        Resource {
            id,
            location: location.into(),
            capacity,
            occupied: 0,
            active: false,
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activation is sticky: false→true only, never reverts.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// True iff `(capacity - occupied) / capacity` strictly exceeds
    /// `threshold`. Compared exactly in integers.
    pub fn vacancy_exceeds(&self, threshold: Ratio) -> bool {
        threshold.exceeded_by(self.capacity - self.occupied, self.capacity)
    }

    /// Increment occupancy. Fails if the resource is already full; the
    /// admission policy never selects a full resource, so this surfacing is
    /// an invariant check rather than a normal error path.
    pub fn occupy(&mut self) -> Result<(), CoreError> {
        if self.occupied >= self.capacity {
            return Err(CoreError::CapacityExceeded);
        }
        self.occupied += 1;
        Ok(())
    }
}

/// A named cluster of resources. Insertion order is preserved and is the
/// activation order for inactive resources.
#[derive(Clone, Debug)]
pub struct Group {
    id: GroupId,
    resources: Vec<Resource>,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Group {
            id,
            resources: Vec::new(),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn push_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn active_count(&self) -> usize {
        self.resources.iter().filter(|r| r.is_active()).count()
    }

    /// Activate inactive resources in insertion order until at least
    /// `min_active` are active or none remain. Returns how many were flipped.
    pub fn activate_to_minimum(&mut self, min_active: u32) -> u32 {
        let mut flipped = 0u32;
        while (self.active_count() as u32) < min_active {
            if !self.activate_next_inactive() {
                break;
            }
            flipped += 1;
        }
        flipped
    }

    /// Activate the first inactive resource in insertion order, if any.
    pub fn activate_next_inactive(&mut self) -> bool {
        match self.resources.iter_mut().find(|r| !r.is_active()) {
            Some(r) => {
                r.activate();
                true
            }
            None => false,
        }
    }

    /// Ids of active resources whose vacancy ratio strictly exceeds
    /// `threshold`, in insertion order.
    pub fn available_resources(&self, threshold: Ratio) -> Vec<&ResourceId> {
        self.resources
            .iter()
            .filter(|r| r.is_active() && r.vacancy_exceeds(threshold))
            .map(Resource::id)
            .collect()
    }

    pub fn resource_mut(&mut self, id: &ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id() == id)
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id)
    }
}

/// Ordered collection of groups; exclusive owner of all resources.
#[derive(Clone, Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
}

impl GroupRegistry {
    pub fn new(groups: Vec<Group>) -> Self {
        GroupRegistry { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    /// Sum of all resource capacities across all groups.
    pub fn total_capacity(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.resources().iter())
            .map(|r| r.capacity() as u64)
            .sum()
    }

    /// Sum of occupied seats across all groups.
    pub fn total_occupied(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.resources().iter())
            .map(|r| r.occupied() as u64)
            .sum()
    }
}

/// A fixed-capacity assignment target for migration.
#[derive(Clone, Debug)]
pub struct Bucket {
    id: BucketId,
    capacity: u32,
    assigned: Vec<EntityId>,
}

impl Bucket {
    pub fn new(id: BucketId, capacity: u32) -> Self {
        Bucket {
            id,
            capacity,
            assigned: Vec::new(),
        }
    }

    pub fn id(&self) -> &BucketId {
        &self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn assigned(&self) -> &[EntityId] {
        &self.assigned
    }

    pub fn assigned_count(&self) -> u32 {
        self.assigned.len() as u32
    }

    pub fn has_vacancy(&self) -> bool {
        self.assigned_count() < self.capacity
    }

    pub fn vacancy(&self) -> u32 {
        self.capacity - self.assigned_count()
    }

    /// Add a member if there is space and it is not already present.
    /// A full bucket makes this a no-op; callers check `has_vacancy` first.
    pub fn assign(&mut self, entity: &EntityId) {
        if self.has_vacancy() && !self.assigned.contains(entity) {
            self.assigned.push(entity.clone());
        }
    }

    pub fn remove(&mut self, entity: &EntityId) {
        self.assigned.retain(|e| e != entity);
    }
}

/// Ordered set of buckets, sorted by id at construction for deterministic
/// iteration. Lookup is by id.
#[derive(Clone, Debug, Default)]
pub struct BucketSet {
    buckets: Vec<Bucket>,
}

impl BucketSet {
    /// Takes ownership and sorts by bucket id.
    pub fn new(mut buckets: Vec<Bucket>) -> Self {
        buckets.sort_by(|a, b| a.id().cmp(b.id()));
        BucketSet { buckets }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, id: &BucketId) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.id() == id)
    }

    pub fn get_mut(&mut self, id: &BucketId) -> Option<&mut Bucket> {
        self.buckets.iter_mut().find(|b| b.id() == id)
    }

    pub fn contains(&self, id: &BucketId) -> bool {
        self.get(id).is_some()
    }
}

/// Migration status of an entity. Declined and Locked are absorbing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MigrationStatus {
    NotOffered,
    Offered,
    Accepted,
    Declined,
    Locked,
}

/// A ranked applicant with an ordered preference list over buckets.
///
/// Status transitions are driven by `adm_engine`; the mutators here keep the
/// current-bucket/status invariant but do not encode round semantics.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    rank: u32,
    preferences: Vec<BucketId>,
    status: MigrationStatus,
    current_bucket: Option<BucketId>,
}

impl Entity {
    pub fn new(id: EntityId, rank: u32, preferences: Vec<BucketId>) -> Self {
        Entity {
            id,
            rank,
            preferences,
            status: MigrationStatus::NotOffered,
            current_bucket: None,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn preferences(&self) -> &[BucketId] {
        &self.preferences
    }

    pub fn status(&self) -> MigrationStatus {
        self.status
    }

    pub fn current_bucket(&self) -> Option<&BucketId> {
        self.current_bucket.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.status == MigrationStatus::Locked
    }

    /// Eligible for a reassignment move: Accepted and not Locked.
    pub fn is_movable(&self) -> bool {
        self.status == MigrationStatus::Accepted
    }

    /// Position of `bucket` in the preference list, if present.
    pub fn preference_position(&self, bucket: &BucketId) -> Option<usize> {
        self.preferences.iter().position(|b| b == bucket)
    }

    /// NotOffered → Offered with a bucket.
    pub fn offer(&mut self, bucket: BucketId) {
        debug_assert_eq!(self.status, MigrationStatus::NotOffered);
        self.status = MigrationStatus::Offered;
        self.current_bucket = Some(bucket);
    }

    /// Offered → Accepted (bucket unchanged).
    pub fn accept(&mut self) {
        debug_assert_eq!(self.status, MigrationStatus::Offered);
        self.status = MigrationStatus::Accepted;
    }

    /// Offered → Declined; the entity leaves its bucket and never re-enters.
    pub fn decline(&mut self) {
        debug_assert_eq!(self.status, MigrationStatus::Offered);
        self.status = MigrationStatus::Declined;
        self.current_bucket = None;
    }

    /// Accepted → Locked (terminal).
    pub fn lock(&mut self) {
        debug_assert_eq!(self.status, MigrationStatus::Accepted);
        self.status = MigrationStatus::Locked;
    }

    /// Accepted → Accepted with a new bucket (reassignment move).
    pub fn reassign(&mut self, bucket: BucketId) {
        debug_assert_eq!(self.status, MigrationStatus::Accepted);
        self.current_bucket = Some(bucket);
    }
}
