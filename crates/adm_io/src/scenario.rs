//! Scenario files: one JSON document describing an admission run, a
//! migration run, or both.
//!
//! ```json
//! {
//!   "admission": {
//!     "seed": 42,
//!     "policy": { "min_active_per_group": 2,
//!                 "vacancy_threshold": { "num": 1, "den": 4 } },
//!     "groups": [
//!       { "id": "Center-A",
//!         "rooms": [ { "id": "R1", "location": "Building A", "capacity": 2 } ] }
//!     ],
//!     "applicants": [ "S1", "S2" ]
//!   },
//!   "migration": {
//!     "rounds": 3,
//!     "buckets": [ { "id": "CSE", "capacity": 1 } ],
//!     "entities": [ { "id": "S1", "rank": 1, "preferences": ["CSE"] } ],
//!     "decisions": { "default": true, "answers": { "S1": [true, false] } }
//!   }
//! }
//! ```
//!
//! Shape errors surface as `IoError::Json`; domain validation (capacities,
//! duplicate ids, unknown references) stays with the `adm_engine` setup
//! builders and surfaces as `IoError::Config`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use adm_algo::{RankOrderPolicy, ThresholdPolicy};
use adm_core::{BucketId, DrawRng, EntityId, GroupId, Ratio, ResourceId, ThresholdParams};
use adm_engine::{
    AdmissionService, EngineError, MigrationEngine, MigrationSetup, RegistryBuilder,
    ScriptedDecisions,
};

use crate::{IoError, IoResult};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission: Option<AdmissionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionSpec {
    /// Seed for the draw RNG; same seed and inputs reproduce the run.
    #[serde(default)]
    pub seed: u64,
    pub policy: PolicySpec,
    pub groups: Vec<GroupSpec>,
    pub applicants: Vec<EntityId>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    pub min_active_per_group: u32,
    pub vacancy_threshold: RatioSpec,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RatioSpec {
    pub num: u32,
    pub den: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub id: GroupId,
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoomSpec {
    pub id: ResourceId,
    #[serde(default)]
    pub location: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationSpec {
    pub rounds: u32,
    pub buckets: Vec<BucketSpec>,
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub decisions: DecisionPlan,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BucketSpec {
    pub id: BucketId,
    pub capacity: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub id: EntityId,
    pub rank: u32,
    pub preferences: Vec<BucketId>,
}

/// Scripted answers: one boolean per prompt in prompt order, per entity,
/// with `default` applying once a queue runs dry.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionPlan {
    #[serde(default = "default_answer")]
    pub default: bool,
    #[serde(default)]
    pub answers: BTreeMap<EntityId, Vec<bool>>,
}

fn default_answer() -> bool {
    true
}

impl Default for DecisionPlan {
    fn default() -> Self {
        DecisionPlan {
            default: true,
            answers: BTreeMap::new(),
        }
    }
}

/// Parse a scenario file. At least one of the two sections must be present.
pub fn load_scenario(path: &Path) -> IoResult<Scenario> {
    let text = fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&text)?;
    if scenario.admission.is_none() && scenario.migration.is_none() {
        return Err(IoError::Scenario(
            "scenario has neither an admission nor a migration section".to_string(),
        ));
    }
    Ok(scenario)
}

fn config_err(e: EngineError) -> IoError {
    IoError::Config(e.to_string())
}

impl AdmissionSpec {
    /// Build the caller-owned admission service; `seed` (when given)
    /// overrides the scenario's seed.
    pub fn build_service(&self, seed: Option<u64>) -> IoResult<AdmissionService> {
        let threshold = Ratio::new_checked(
            self.policy.vacancy_threshold.num,
            self.policy.vacancy_threshold.den,
        )
        .map_err(|e| IoError::Config(format!("vacancy_threshold: {e}")))?;

        let mut builder = RegistryBuilder::new();
        for group in &self.groups {
            builder.register_group(group.id.clone()).map_err(config_err)?;
            for room in &group.rooms {
                builder
                    .add_resource(
                        &group.id,
                        room.id.clone(),
                        room.location.clone(),
                        room.capacity,
                    )
                    .map_err(config_err)?;
            }
        }

        Ok(AdmissionService::new(
            builder.build().map_err(config_err)?,
            Box::new(ThresholdPolicy::new(ThresholdParams {
                min_active_per_group: self.policy.min_active_per_group,
                vacancy_threshold: threshold,
            })),
            DrawRng::from_seed_u64(seed.unwrap_or(self.seed)),
        ))
    }
}

impl MigrationSpec {
    pub fn build_engine(&self) -> IoResult<MigrationEngine> {
        let mut setup = MigrationSetup::new();
        for bucket in &self.buckets {
            setup
                .register_bucket(bucket.id.clone(), bucket.capacity)
                .map_err(config_err)?;
        }
        for entity in &self.entities {
            setup
                .register_entity(entity.id.clone(), entity.rank, entity.preferences.clone())
                .map_err(config_err)?;
        }
        let (buckets, entities) = setup.build().map_err(config_err)?;
        Ok(MigrationEngine::new(
            buckets,
            entities,
            Box::new(RankOrderPolicy),
        ))
    }
}

impl DecisionPlan {
    pub fn build_provider(&self) -> ScriptedDecisions {
        ScriptedDecisions::from_pairs(
            self.answers.iter().map(|(k, v)| (k.clone(), v.clone())),
            self.default,
        )
    }
}
