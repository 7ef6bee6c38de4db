//! Movement execution
//!
//! Commits a path decision by mutating an army's location or road state.
//! Local roads and linked pairs are crossed instantly; regional roads put
//! the army on the entry stage and leave the per-turn road advance to walk
//! it forward.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId};
use crate::ops::pathfind::{find_safe_path, PathStep};
use crate::world::road::RoadQuality;
use crate::world::{ArmyPosition, World};

/// Outcome of a march commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarchResult {
    /// Crossed a local road or linked pair this turn.
    Arrived(LocationId),
    /// Entered a regional road; the road advance takes it from here.
    OnRoad,
    /// Already standing at the goal.
    AlreadyThere,
    /// No safe route; army untouched, eligible again next pass.
    NoPath,
}

/// Resolve a safe path toward `goal` and commit its first leg.
pub fn begin_march(
    world: &mut World,
    config: &OpsConfig,
    army_id: ArmyId,
    goal: LocationId,
) -> MarchResult {
    let Some(army) = world.army(army_id) else {
        return MarchResult::NoPath;
    };
    let Some(start) = army.location() else {
        return MarchResult::NoPath;
    };
    if start == goal {
        return MarchResult::AlreadyThere;
    }
    let faction = army.faction;

    let Some(path) = find_safe_path(world, config, faction, start, goal) else {
        tracing::debug!(?army_id, ?start, ?goal, "no safe path, march skipped");
        return MarchResult::NoPath;
    };
    let Some(&first) = path.steps.first() else {
        return MarchResult::AlreadyThere;
    };

    match first {
        PathStep::Linked { to } => {
            if let Some(army) = world.army_mut(army_id) {
                army.arrive_at(to);
            }
            MarchResult::Arrived(to)
        }
        PathStep::Road { road, to } => {
            let Some(road) = world.road(road) else {
                return MarchResult::NoPath;
            };
            match road.quality {
                RoadQuality::Local => {
                    if let Some(army) = world.army_mut(army_id) {
                        army.arrive_at(to);
                    }
                    MarchResult::Arrived(to)
                }
                RoadQuality::Regional => {
                    let Some(direction) = road.direction_from(start) else {
                        return MarchResult::NoPath;
                    };
                    let stage = road.entry_stage(direction);
                    let road_id = road.id;
                    if let Some(army) = world.army_mut(army_id) {
                        army.garrisoned = false;
                        army.position = ArmyPosition::OnRoad {
                            road: road_id,
                            stage,
                            direction,
                            origin: start,
                            destination: goal,
                        };
                    }
                    MarchResult::OnRoad
                }
            }
        }
    }
}

/// Turn an on-road army around toward the location it set out from.
pub fn reverse_march(world: &mut World, army_id: ArmyId) {
    let Some(army) = world.army_mut(army_id) else {
        return;
    };
    if let ArmyPosition::OnRoad {
        direction,
        origin,
        destination,
        ..
    } = &mut army.position
    {
        *direction = direction.flipped();
        std::mem::swap(origin, destination);
        army.garrisoned = false;
    }
}

/// Location an on-road army will reach on the next road advance, or `None`
/// if it is stalled or still has stages ahead of it.
pub fn next_arrival(world: &World, army_id: ArmyId) -> Option<LocationId> {
    let army = world.army(army_id)?;
    if army.garrisoned {
        return None;
    }
    let ArmyPosition::OnRoad {
        road,
        stage,
        direction,
        ..
    } = army.position
    else {
        return None;
    };
    let road = world.road(road)?;
    match road.next_stage(stage, direction) {
        Some(_) => None,
        None => Some(road.exit_for(direction)),
    }
}

/// The per-turn road advance: every marching army moves one stage, armies
/// past the last stage arrive at the road's end.
///
/// The turn loop runs this once per turn after all faction passes.
pub fn advance_road_armies(world: &mut World) {
    let on_road: Vec<ArmyId> = world
        .armies
        .values()
        .filter(|a| a.is_on_road() && !a.garrisoned)
        .map(|a| a.id)
        .collect();

    for id in on_road {
        let Some(army) = world.army(id) else {
            continue;
        };
        let ArmyPosition::OnRoad {
            road,
            stage,
            direction,
            ..
        } = army.position
        else {
            continue;
        };
        let Some(road) = world.road(road) else {
            continue;
        };
        let next = road.next_stage(stage, direction);
        let exit = road.exit_for(direction);
        if let Some(army) = world.army_mut(id) {
            match next {
                Some(next_stage) => {
                    if let ArmyPosition::OnRoad { stage, .. } = &mut army.position {
                        *stage = next_stage;
                    }
                }
                None => army.arrive_at(exit),
            }
        }
    }
}
