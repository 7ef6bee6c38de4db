use thiserror::Error;

use crate::core::types::{ArmyId, LocationId, MissionId, RoadId};

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Army not found: {0:?}")]
    ArmyNotFound(ArmyId),

    #[error("Location not found: {0:?}")]
    LocationNotFound(LocationId),

    #[error("Road not found: {0:?}")]
    RoadNotFound(RoadId),

    #[error("Mission not found: {0:?}")]
    MissionNotFound(MissionId),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpsError>;
