//! Mission records
//!
//! Missions are created by the upstream strategy layer and mutated in place
//! by this engine; mutation is how results flow back to the caller.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{LocationId, MissionId, RoadId, Strength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    Campaign,
    Defend,
    RoadDefense,
}

impl MissionKind {
    /// Dispatch priority; higher runs first.
    pub fn priority(self) -> u32 {
        match self {
            Self::Campaign => 100,
            Self::Defend => 50,
            Self::RoadDefense => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    Planning,
    Active,
    Completed,
    Failed,
}

/// Campaign progression; forward-only except the zombie regression back to
/// `Gathering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CampaignStage {
    Gathering,
    Moving,
    Sieging,
    Assaulting,
    Completed,
}

impl CampaignStage {
    /// Forces are launched and in contact with the enemy.
    pub fn is_active_offense(self) -> bool {
        matches!(self, Self::Moving | Self::Sieging | Self::Assaulting)
    }
}

/// What a mission is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionTarget {
    Location(LocationId),
    Road(RoadId),
}

impl MissionTarget {
    pub fn location(self) -> Option<LocationId> {
        match self {
            Self::Location(loc) => Some(loc),
            Self::Road(_) => None,
        }
    }

    pub fn road(self) -> Option<RoadId> {
        match self {
            Self::Road(road) => Some(road),
            Self::Location(_) => None,
        }
    }
}

/// How a campaign masses its forces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CampaignMode {
    /// One staging point feeding one axis of advance.
    SingleStaging {
        staging: LocationId,
        required_strength: Strength,
    },
    /// Multiple staging points launching in the same turn.
    Convergent {
        stagings: Vec<LocationId>,
        required_strength: Strength,
        /// Last computed readiness per staging point.
        ready: AHashMap<LocationId, bool>,
    },
}

impl CampaignMode {
    pub fn required_strength(&self) -> Strength {
        match self {
            Self::SingleStaging { required_strength, .. }
            | Self::Convergent { required_strength, .. } => *required_strength,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub kind: MissionKind,
    pub status: MissionStatus,
    /// Tie-breaker within a kind; set upstream.
    pub priority: i32,
    pub target: MissionTarget,
    /// Meaningful only for campaigns.
    pub stage: CampaignStage,
    /// Meaningful only for campaigns.
    pub mode: Option<CampaignMode>,
    /// Strength a defend mission is expected to hold.
    pub required_strength: Strength,
}

impl Mission {
    pub fn campaign(
        id: MissionId,
        target: LocationId,
        staging: LocationId,
        required_strength: Strength,
    ) -> Self {
        Self {
            id,
            kind: MissionKind::Campaign,
            status: MissionStatus::Planning,
            priority: 0,
            target: MissionTarget::Location(target),
            stage: CampaignStage::Gathering,
            mode: Some(CampaignMode::SingleStaging {
                staging,
                required_strength,
            }),
            required_strength,
        }
    }

    pub fn convergent_campaign(
        id: MissionId,
        target: LocationId,
        stagings: Vec<LocationId>,
        required_strength: Strength,
    ) -> Self {
        Self {
            id,
            kind: MissionKind::Campaign,
            status: MissionStatus::Planning,
            priority: 0,
            target: MissionTarget::Location(target),
            stage: CampaignStage::Gathering,
            mode: Some(CampaignMode::Convergent {
                stagings,
                required_strength,
                ready: AHashMap::new(),
            }),
            required_strength,
        }
    }

    pub fn defend(id: MissionId, target: LocationId, required_strength: Strength) -> Self {
        Self {
            id,
            kind: MissionKind::Defend,
            status: MissionStatus::Planning,
            priority: 0,
            target: MissionTarget::Location(target),
            stage: CampaignStage::Gathering,
            mode: None,
            required_strength,
        }
    }

    pub fn road_defense(id: MissionId, target: RoadId) -> Self {
        Self {
            id,
            kind: MissionKind::RoadDefense,
            status: MissionStatus::Planning,
            priority: 0,
            target: MissionTarget::Road(target),
            stage: CampaignStage::Gathering,
            mode: None,
            required_strength: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
