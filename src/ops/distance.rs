//! Unweighted hop-count distance over the road graph
//!
//! Used only for ranking and ordering candidates. Legality of a march is
//! always decided by the safe pathfinder, never by this estimate.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::core::types::LocationId;
use crate::world::World;

/// Number of road hops between two locations, ignoring ownership and
/// occupancy. `None` if the graph does not connect them.
pub fn hop_distance(world: &World, from: LocationId, to: LocationId) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    let mut dist: AHashMap<LocationId, u32> = AHashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(from, 0);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        for neighbor in world.neighbors(current) {
            if dist.contains_key(&neighbor) {
                continue;
            }
            if neighbor == to {
                return Some(d + 1);
            }
            dist.insert(neighbor, d + 1);
            queue.push_back(neighbor);
        }
    }
    None
}
