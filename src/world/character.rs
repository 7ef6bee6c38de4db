//! Characters: leaders and heroes attached to the war effort

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, CharacterId, FactionId, LocationId};

/// Typed character capabilities relevant to military operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Presence alone holds a location; the garrison floor drops to zero.
    GarrisonSubstitute,
    /// Siege works cost half the usual gold.
    SiegeCostReduction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub faction: FactionId,
    pub location: Option<LocationId>,
    /// Army this character leads, repointed on consolidation.
    pub commanding: Option<ArmyId>,
    pub capabilities: AHashSet<Capability>,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>, faction: FactionId) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            location: None,
            commanding: None,
            capabilities: AHashSet::new(),
        }
    }

    pub fn at(mut self, location: LocationId) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_capability(mut self, cap: Capability) -> Self {
        self.capabilities.insert(cap);
        self
    }

    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }
}
