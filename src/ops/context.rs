//! Per-turn, per-faction commitment tracking
//!
//! The assigned set is the only guard against an army being committed twice
//! in one pass. Every handler must claim an army here before acting on it.

use ahash::AHashSet;

use crate::core::types::{ArmyId, FactionId};

#[derive(Debug)]
pub struct TurnContext {
    pub faction: FactionId,
    assigned: AHashSet<ArmyId>,
}

impl TurnContext {
    pub fn new(faction: FactionId) -> Self {
        Self {
            faction,
            assigned: AHashSet::new(),
        }
    }

    /// Claim an army for this turn. Returns false if already claimed.
    pub fn claim(&mut self, id: ArmyId) -> bool {
        self.assigned.insert(id)
    }

    pub fn is_claimed(&self, id: ArmyId) -> bool {
        self.assigned.contains(&id)
    }
}
