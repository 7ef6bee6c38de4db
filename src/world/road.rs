//! Roads connecting locations
//!
//! Local roads are short enough to cross within a turn. Regional roads are
//! divided into stages an army occupies one at a time.

use serde::{Deserialize, Serialize};

use crate::core::types::{LocationId, RoadId};
use crate::world::army::RoadDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadQuality {
    /// Crossed instantly.
    Local,
    /// Traversed stage by stage, one per turn.
    Regional,
}

/// One stretch of a regional road
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadStage {
    /// Watchtowers or forts built on this stretch.
    pub fortification: u32,
    /// Terrain defense value (passes, fords).
    pub natural_defense: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub from: LocationId,
    pub to: LocationId,
    pub quality: RoadQuality,
    pub stages: Vec<RoadStage>,
}

impl Road {
    pub fn local(id: RoadId, from: LocationId, to: LocationId) -> Self {
        Self {
            id,
            from,
            to,
            quality: RoadQuality::Local,
            stages: Vec::new(),
        }
    }

    pub fn regional(id: RoadId, from: LocationId, to: LocationId, stages: usize) -> Self {
        Self {
            id,
            from,
            to,
            quality: RoadQuality::Regional,
            stages: vec![RoadStage::default(); stages.max(1)],
        }
    }

    /// Turns an army needs to traverse this road. Never zero.
    pub fn travel_turns(&self) -> u32 {
        match self.quality {
            RoadQuality::Local => 1,
            RoadQuality::Regional => self.stages.len().max(1) as u32,
        }
    }

    pub fn connects(&self, loc: LocationId) -> bool {
        self.from == loc || self.to == loc
    }

    /// The endpoint opposite `loc`, if `loc` is an endpoint.
    pub fn other_end(&self, loc: LocationId) -> Option<LocationId> {
        if self.from == loc {
            Some(self.to)
        } else if self.to == loc {
            Some(self.from)
        } else {
            None
        }
    }

    /// Direction of travel when entering from `origin`.
    pub fn direction_from(&self, origin: LocationId) -> Option<RoadDirection> {
        if self.from == origin {
            Some(RoadDirection::Forward)
        } else if self.to == origin {
            Some(RoadDirection::Reverse)
        } else {
            None
        }
    }

    /// Stage index an army enters at when travelling in `direction`.
    pub fn entry_stage(&self, direction: RoadDirection) -> usize {
        match direction {
            RoadDirection::Forward => 0,
            RoadDirection::Reverse => self.stages.len().saturating_sub(1),
        }
    }

    /// Endpoint reached when travelling in `direction`.
    pub fn exit_for(&self, direction: RoadDirection) -> LocationId {
        match direction {
            RoadDirection::Forward => self.to,
            RoadDirection::Reverse => self.from,
        }
    }

    /// Next stage index in `direction`, or `None` past the road's end.
    pub fn next_stage(&self, stage: usize, direction: RoadDirection) -> Option<usize> {
        match direction {
            RoadDirection::Forward => {
                let next = stage + 1;
                (next < self.stages.len()).then_some(next)
            }
            RoadDirection::Reverse => stage.checked_sub(1),
        }
    }
}
