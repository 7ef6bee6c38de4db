//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Unique identifier for factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// Unique identifier for armies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

/// Unique identifier for locations on the strategic map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u32);

/// Unique identifier for roads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadId(pub u32);

/// Unique identifier for missions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub u32);

/// Unique identifier for characters (leaders, heroes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

/// Army strength in soldiers
pub type Strength = u32;

/// Monotonic id source for armies minted at runtime (splits, merges).
///
/// Deterministic: the same sequence of operations always yields the same
/// ids, which keeps replays and tests reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_army: u32,
}

impl IdAllocator {
    /// Start allocating above any id already present in the world.
    pub fn starting_at(next_army: u32) -> Self {
        Self { next_army }
    }

    pub fn next_army_id(&mut self) -> ArmyId {
        let id = ArmyId(self.next_army);
        self.next_army += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
