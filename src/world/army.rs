//! Armies on the strategic map
//!
//! An army is either stationed at a location or strung out along a road
//! stage. All strength mutation goes through the world registry so that
//! zero-strength armies are reaped.

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, FactionId, LocationId, RoadId, Strength};

/// Travel direction along a road's stage list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadDirection {
    /// From the road's `from` endpoint toward `to` (ascending stage index)
    Forward,
    /// From `to` toward `from` (descending stage index)
    Reverse,
}

impl RoadDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Where an army currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmyPosition {
    AtLocation(LocationId),
    OnRoad {
        road: RoadId,
        stage: usize,
        direction: RoadDirection,
        /// Location the army set out from; reversal target.
        origin: LocationId,
        /// Final destination of the current march, past the road's end.
        destination: LocationId,
    },
}

/// A field army
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub id: ArmyId,
    pub faction: FactionId,
    pub strength: Strength,
    pub position: ArmyPosition,
    /// Holding its current location; not eligible for redeployment.
    pub garrisoned: bool,
    /// Already fought or force-marched this turn.
    pub spent: bool,
    /// Conducting a siege; pinned until the siege resolves.
    pub sieging: bool,
    /// Rebel band, ignored by faction consolidation and missions.
    pub insurgent: bool,
    /// Committed to an action this turn by a handler.
    pub committed: bool,
}

impl Army {
    pub fn new(id: ArmyId, faction: FactionId, strength: Strength, at: LocationId) -> Self {
        Self {
            id,
            faction,
            strength,
            position: ArmyPosition::AtLocation(at),
            garrisoned: false,
            spent: false,
            sieging: false,
            insurgent: false,
            committed: false,
        }
    }

    pub fn with_garrisoned(mut self) -> Self {
        self.garrisoned = true;
        self
    }

    /// Location the army stands at, if not on a road.
    pub fn location(&self) -> Option<LocationId> {
        match self.position {
            ArmyPosition::AtLocation(loc) => Some(loc),
            ArmyPosition::OnRoad { .. } => None,
        }
    }

    pub fn is_on_road(&self) -> bool {
        matches!(self.position, ArmyPosition::OnRoad { .. })
    }

    /// Free for redeployment by the idle handler.
    pub fn is_idle(&self) -> bool {
        !self.garrisoned && !self.spent && !self.sieging && !self.insurgent && !self.committed
    }

    /// Eligible for end-of-turn consolidation into a combined army.
    pub fn mergeable(&self) -> bool {
        !self.spent && !self.insurgent && !self.sieging && !self.committed
    }

    /// Clear movement state after an instant arrival.
    pub fn arrive_at(&mut self, loc: LocationId) {
        self.position = ArmyPosition::AtLocation(loc);
        self.garrisoned = false;
    }
}
