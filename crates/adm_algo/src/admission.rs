//! Threshold-based admission policy.
//!
//! Contract, per invocation (stateless apart from activation flips):
//! 1. Visit groups in a freshly shuffled order (injected RNG).
//! 2. Top the visited group up to `min_active_per_group` active resources
//!    (inactive resources activate in insertion order).
//! 3. A resource is available iff its vacancy ratio strictly exceeds
//!    `vacancy_threshold` (exact integer comparison, no floats).
//! 4. If nothing is available, activate exactly one more inactive resource
//!    and re-derive availability.
//! 5. Pick uniformly among the group's available resources and stop;
//!    otherwise continue to the next group.
//! 6. All groups exhausted → `ResourceExhausted`.
//!
//! Activation is sticky: flips persist even when the group is skipped.
//! Determinism: both draws (group order, resource pick) come only from the
//! provided `DrawRng` stream.

use adm_core::{DrawRng, GroupRegistry, ThresholdParams};

use crate::{AdmissionPolicy, Selection};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectError {
    /// No group has an admissible resource; the only error path.
    ResourceExhausted,
}

impl core::fmt::Display for SelectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SelectError::ResourceExhausted => write!(f, "no admissible resource in any group"),
        }
    }
}

impl std::error::Error for SelectError {}

/// The threshold-based strategy (the only shipped admission policy).
#[derive(Clone, Copy, Debug)]
pub struct ThresholdPolicy {
    params: ThresholdParams,
}

impl ThresholdPolicy {
    pub fn new(params: ThresholdParams) -> Self {
        ThresholdPolicy { params }
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }
}

impl AdmissionPolicy for ThresholdPolicy {
    fn select(
        &self,
        registry: &mut GroupRegistry,
        rng: &mut DrawRng,
    ) -> Result<Selection, SelectError> {
        let threshold = self.params.vacancy_threshold;

        // Re-shuffle the visiting order on every invocation so no group is
        // disadvantaged by iteration order across calls.
        let mut order: Vec<usize> = (0..registry.len()).collect();
        rng.shuffle_in_place(&mut order);

        for gi in order {
            let group = &mut registry.groups_mut()[gi];

            group.activate_to_minimum(self.params.min_active_per_group);

            let mut available: Vec<_> = group
                .available_resources(threshold)
                .into_iter()
                .cloned()
                .collect();
            if available.is_empty() && group.activate_next_inactive() {
                available = group
                    .available_resources(threshold)
                    .into_iter()
                    .cloned()
                    .collect();
            }

            if !available.is_empty() {
                let idx = rng
                    .choose_one_index(&available)
                    .expect("non-empty availability set");
                return Ok(Selection {
                    group: group.id().clone(),
                    resource: available[idx].clone(),
                });
            }
            // Group yielded nothing even after the extra activation; the
            // flips stay and the next group is tried.
        }

        Err(SelectError::ResourceExhausted)
    }
}
