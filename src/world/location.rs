//! Locations: cities and their surrounding rural areas

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    City,
    Rural,
}

/// A settlement or rural area on the strategic map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// `None` = neutral, unaligned.
    pub faction: Option<FactionId>,
    pub kind: LocationKind,
    /// Wall level; 0 = unfortified.
    pub fortification: u32,
    pub population: u32,
    /// 0-100; low stability breeds unrest and demands a larger garrison.
    pub stability: u32,
    /// Designated strategic point; higher garrison floor, idle armies
    /// redeploy here.
    pub strategic: bool,
    /// Stored food; read only by this engine (negotiation branch).
    pub food: i32,
    /// Trade volume; read only by this engine.
    pub trade: i32,
    /// Paired city or rural area reachable at zero cost.
    pub linked: Option<LocationId>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            id,
            name: name.into(),
            faction: None,
            kind,
            fortification: 0,
            population: 50_000,
            stability: 60,
            strategic: false,
            food: 0,
            trade: 0,
            linked: None,
        }
    }

    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn with_fortification(mut self, level: u32) -> Self {
        self.fortification = level;
        self
    }

    pub fn with_population(mut self, population: u32, stability: u32) -> Self {
        self.population = population;
        self.stability = stability;
        self
    }

    pub fn with_strategic(mut self) -> Self {
        self.strategic = true;
        self
    }

    pub fn with_food(mut self, food: i32) -> Self {
        self.food = food;
        self
    }

    pub fn with_link(mut self, other: LocationId) -> Self {
        self.linked = Some(other);
        self
    }

    pub fn is_neutral(&self) -> bool {
        self.faction.is_none()
    }

    /// Hostile to `faction`: held by somebody else, not neutral.
    pub fn is_hostile_to(&self, faction: FactionId) -> bool {
        matches!(self.faction, Some(f) if f != faction)
    }

    pub fn is_held_by(&self, faction: FactionId) -> bool {
        self.faction == Some(faction)
    }

    /// Static defense bonus granted by the walls.
    pub fn defense_bonus(&self, bonus_per_level: u32) -> u32 {
        self.fortification * bonus_per_level
    }
}
