//! Safe pathfinding over the strategic road graph
//!
//! Dijkstra weighted by travel time plus penalties for contested ground.
//! An army may only cross friendly or neutral territory; hostile locations
//! are enterable solely as the march's destination (offensive campaigns
//! target hostile ground).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::OpsConfig;
use crate::core::types::{FactionId, LocationId, RoadId};
use crate::world::World;

/// One leg of a resolved march
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStep {
    /// Travel a road to its far end.
    Road { road: RoadId, to: LocationId },
    /// Cross between a city and its paired rural area. Free and instant.
    Linked { to: LocationId },
}

impl PathStep {
    pub fn to(self) -> LocationId {
        match self {
            Self::Road { to, .. } | Self::Linked { to } => to,
        }
    }
}

/// A legal route from start to destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafePath {
    pub steps: Vec<PathStep>,
}

impl SafePath {
    pub fn destination(&self) -> Option<LocationId> {
        self.steps.last().map(|s| s.to())
    }
}

/// Node in the Dijkstra open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueNode {
    cost: u32,
    loc: LocationId,
}

impl Ord for QueueNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.loc.cmp(&self.loc))
    }
}

impl PartialOrd for QueueNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weight of entering `neighbor` by an edge taking `travel_turns`.
fn edge_cost(
    world: &World,
    config: &OpsConfig,
    faction: FactionId,
    neighbor: LocationId,
    goal: LocationId,
    travel_turns: u32,
) -> u32 {
    let mut cost = travel_turns;
    if let Some(loc) = world.location(neighbor) {
        if loc.is_hostile_to(faction) && neighbor != goal {
            cost += config.hostile_node_penalty;
        }
    }
    if world.enemy_strength_at(neighbor, faction) > 0 {
        cost += config.occupied_node_penalty;
    }
    cost
}

/// May the march pass through `neighbor` at all?
fn enterable(world: &World, faction: FactionId, neighbor: LocationId, goal: LocationId) -> bool {
    match world.location(neighbor) {
        Some(loc) => neighbor == goal || !loc.is_hostile_to(faction),
        None => false,
    }
}

/// Find the cheapest safe route.
///
/// Returns `None` when the destination is unreachable without crossing
/// hostile territory.
pub fn find_safe_path(
    world: &World,
    config: &OpsConfig,
    faction: FactionId,
    start: LocationId,
    goal: LocationId,
) -> Option<SafePath> {
    if start == goal {
        return Some(SafePath { steps: Vec::new() });
    }

    let mut open = BinaryHeap::new();
    let mut best: AHashMap<LocationId, u32> = AHashMap::new();
    let mut came_from: AHashMap<LocationId, (LocationId, PathStep)> = AHashMap::new();

    best.insert(start, 0);
    open.push(QueueNode { cost: 0, loc: start });

    while let Some(QueueNode { cost, loc }) = open.pop() {
        if loc == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if cost > best.get(&loc).copied().unwrap_or(u32::MAX) {
            continue;
        }

        let mut edges: Vec<(PathStep, u32)> = Vec::new();
        for road in world.roads_at(loc) {
            if let Some(other) = road.other_end(loc) {
                edges.push((
                    PathStep::Road { road: road.id, to: other },
                    road.travel_turns(),
                ));
            }
        }
        if let Some(linked) = world.location(loc).and_then(|l| l.linked) {
            edges.push((PathStep::Linked { to: linked }, 0));
        }

        for (step, travel) in edges {
            let neighbor = step.to();
            if !enterable(world, faction, neighbor, goal) {
                continue;
            }
            let tentative = cost + edge_cost(world, config, faction, neighbor, goal, travel);
            if tentative < best.get(&neighbor).copied().unwrap_or(u32::MAX) {
                best.insert(neighbor, tentative);
                came_from.insert(neighbor, (loc, step));
                open.push(QueueNode { cost: tentative, loc: neighbor });
            }
        }
    }

    None
}

fn reconstruct(
    came_from: &AHashMap<LocationId, (LocationId, PathStep)>,
    start: LocationId,
    goal: LocationId,
) -> SafePath {
    let mut steps = Vec::new();
    let mut current = goal;
    while current != start {
        let Some(&(prev, step)) = came_from.get(&current) else {
            break;
        };
        steps.push(step);
        current = prev;
    }
    steps.reverse();
    SafePath { steps }
}
