//! External decision boundary for migration rounds.
//!
//! The engine blocks synchronously on these callbacks at the points fixed by
//! the round state machine. A console-prompt provider would be one concrete
//! implementation; the shipped ones are non-interactive.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use adm_core::{BucketId, EntityId};

/// Answer to an offer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Accept,
    Decline,
}

/// Answer to a lock prompt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockDecision {
    Lock,
    Continue,
}

/// Supplies accept/decline and lock decisions for entities as rounds ask
/// for them. Called synchronously; the engine blocks on the return value.
pub trait DecisionProvider {
    /// The entity has been offered (or migrated into) `bucket`: take it?
    fn offer(&mut self, entity: &EntityId, bucket: &BucketId) -> Decision;

    /// The entity holds `bucket` with status Accepted: lock it in?
    fn lock(&mut self, entity: &EntityId, bucket: &BucketId) -> LockDecision;
}

/// Accept every offer, never lock.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl DecisionProvider for AcceptAll {
    fn offer(&mut self, _entity: &EntityId, _bucket: &BucketId) -> Decision {
        Decision::Accept
    }

    fn lock(&mut self, _entity: &EntityId, _bucket: &BucketId) -> LockDecision {
        LockDecision::Continue
    }
}

/// Decline every offer (lock prompts never fire for declined entities, but
/// answer Continue for completeness).
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclineAll;

impl DecisionProvider for DeclineAll {
    fn offer(&mut self, _entity: &EntityId, _bucket: &BucketId) -> Decision {
        Decision::Decline
    }

    fn lock(&mut self, _entity: &EntityId, _bucket: &BucketId) -> LockDecision {
        LockDecision::Continue
    }
}

/// Scripted answers, one queue per entity, consumed one answer per prompt in
/// the order prompts occur (offer and lock prompts share the queue, exactly
/// like an input stream feeding interactive prompts). When a queue runs dry
/// the `default` answer applies.
#[derive(Clone, Debug)]
pub struct ScriptedDecisions {
    answers: BTreeMap<EntityId, VecDeque<bool>>,
    default: bool,
}

impl ScriptedDecisions {
    pub fn new(answers: BTreeMap<EntityId, VecDeque<bool>>, default: bool) -> Self {
        ScriptedDecisions { answers, default }
    }

    /// Convenience: build from `(entity, [yes/no answers...])` pairs.
    pub fn from_pairs<I>(pairs: I, default: bool) -> Self
    where
        I: IntoIterator<Item = (EntityId, Vec<bool>)>,
    {
        let answers = pairs
            .into_iter()
            .map(|(id, v)| (id, VecDeque::from(v)))
            .collect();
        ScriptedDecisions { answers, default }
    }

    fn next_answer(&mut self, entity: &EntityId) -> bool {
        self.answers
            .get_mut(entity)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.default)
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn offer(&mut self, entity: &EntityId, _bucket: &BucketId) -> Decision {
        if self.next_answer(entity) {
            Decision::Accept
        } else {
            Decision::Decline
        }
    }

    fn lock(&mut self, entity: &EntityId, _bucket: &BucketId) -> LockDecision {
        if self.next_answer(entity) {
            LockDecision::Lock
        } else {
            LockDecision::Continue
        }
    }
}
