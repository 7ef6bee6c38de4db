//! Reinforcement pulling
//!
//! Ranks surplus strength elsewhere and marches it toward a target,
//! splitting armies when a whole transfer would strip the source bare.
//! Prefers whole-army transfers over fragmentation and never breaches
//! garrison or frontier floors, except for the one explicitly overridden
//! location (a campaign draining its own staging point).

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId, Strength};
use crate::ops::context::TurnContext;
use crate::ops::distance::hop_distance;
use crate::ops::garrison::min_garrison;
use crate::ops::movement::{begin_march, MarchResult};
use crate::ops::pathfind::find_safe_path;
use crate::world::World;

/// Pull up to `max_amount` strength toward `target`.
///
/// `floor_override` names the single location whose garrison floor may be
/// breached. Returns the strength actually dispatched.
pub fn pull_reinforcements(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    target: LocationId,
    max_amount: Strength,
    floor_override: Option<LocationId>,
) -> Strength {
    let faction = ctx.faction;

    // Unassigned armies stationed elsewhere, strongest first, nearer
    // sources breaking ties.
    let mut candidates: Vec<(ArmyId, LocationId, Strength)> = world
        .armies
        .values()
        .filter(|a| a.faction == faction && a.mergeable() && !ctx.is_claimed(a.id))
        .filter_map(|a| a.location().map(|loc| (a.id, loc, a.strength)))
        .filter(|(_, loc, _)| *loc != target)
        .collect();
    candidates.sort_by(|a, b| {
        b.2.cmp(&a.2).then_with(|| {
            let da = hop_distance(world, a.1, target).unwrap_or(u32::MAX);
            let db = hop_distance(world, b.1, target).unwrap_or(u32::MAX);
            da.cmp(&db)
        })
    });

    let mut moved: Strength = 0;
    for (army_id, source, strength) in candidates {
        if moved >= max_amount {
            break;
        }
        // Live lookups: an earlier iteration may have consumed this army.
        if world.army(army_id).is_none() {
            continue;
        }

        let floor = if floor_override == Some(source) {
            0
        } else {
            min_garrison(world, config, source, faction)
        };
        let source_total = world.strength_at(source, faction);
        if source_total <= floor {
            continue;
        }
        if find_safe_path(world, config, faction, source, target).is_none() {
            continue;
        }

        let remainder_after_whole = source_total.saturating_sub(strength);
        let frontier_ok = floor_override == Some(source)
            || !world.is_frontier(source, faction)
            || remainder_after_whole >= config.frontier_floor;

        if remainder_after_whole >= floor && frontier_ok {
            // Whole-army transfer keeps the source defensible.
            if !ctx.claim(army_id) {
                continue;
            }
            if begin_march(world, config, army_id, target) == MarchResult::NoPath {
                continue;
            }
            moved += strength;
        } else {
            let surplus = source_total - floor;
            if surplus < config.min_split_surplus || surplus >= strength {
                continue;
            }
            let Ok(detached) = world.split_army(army_id, surplus) else {
                continue;
            };
            if let Some(remainder) = world.army_mut(army_id) {
                remainder.garrisoned = true;
            }
            if !ctx.claim(detached) {
                continue;
            }
            if begin_march(world, config, detached, target) == MarchResult::NoPath {
                continue;
            }
            moved += surplus;
        }
    }

    tracing::debug!(?target, moved, max_amount, "reinforcement pull resolved");
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, RoadId};
    use crate::world::{Faction, Location, LocationKind, Road};

    /// Target 1 fed by sources 2 and 3, all friendly, local roads.
    fn pull_world() -> World {
        let mut world = World::new();
        world.add_faction(Faction::new(FactionId(1), "Ardan"));
        for id in [1, 2, 3] {
            world.add_location(
                Location::new(LocationId(id), format!("L{id}"), LocationKind::City)
                    .with_faction(FactionId(1))
                    .with_population(10_000, 100),
            );
        }
        world.add_road(Road::local(RoadId(1), LocationId(2), LocationId(1)));
        world.add_road(Road::local(RoadId(2), LocationId(3), LocationId(1)));
        world
    }

    #[test]
    fn test_whole_army_moves_when_floor_holds() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        // Floor at L2 is 500; garrison army stays, field army may leave.
        world.spawn_army(FactionId(1), 600, LocationId(2));
        let field = world.spawn_army(FactionId(1), 900, LocationId(2));

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 900, None);
        assert_eq!(moved, 900);
        assert_eq!(world.army(field).unwrap().location(), Some(LocationId(1)));
        assert_eq!(world.strength_at(LocationId(2), FactionId(1)), 600);
    }

    #[test]
    fn test_split_when_whole_move_breaches_floor() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        // Single army of 1200 at L2; moving it all would empty the town.
        let home = world.spawn_army(FactionId(1), 1200, LocationId(2));

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 2000, None);
        assert_eq!(moved, 700);
        let remainder = world.army(home).unwrap();
        assert_eq!(remainder.strength, 500);
        assert!(remainder.garrisoned);
        assert_eq!(world.strength_at(LocationId(1), FactionId(1)), 700);
    }

    #[test]
    fn test_small_surplus_not_worth_fragmenting() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        // Surplus of 300 over the 500 floor; below the split threshold.
        let home = world.spawn_army(FactionId(1), 800, LocationId(2));

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 2000, None);
        assert_eq!(moved, 0);
        assert_eq!(world.army(home).unwrap().strength, 800);
    }

    #[test]
    fn test_strongest_candidates_consumed_first() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(1), 600, LocationId(2));
        let weak = world.spawn_army(FactionId(1), 700, LocationId(2));
        world.spawn_army(FactionId(1), 600, LocationId(3));
        let strong = world.spawn_army(FactionId(1), 1500, LocationId(3));

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 1500, None);
        assert_eq!(moved, 1500);
        assert_eq!(world.army(strong).unwrap().location(), Some(LocationId(1)));
        assert_eq!(world.army(weak).unwrap().location(), Some(LocationId(2)));
    }

    #[test]
    fn test_frontier_source_keeps_thousand() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        // L3 borders an enemy keep, making it a frontier location.
        world.add_location(
            Location::new(LocationId(9), "Enemy Keep", LocationKind::City)
                .with_faction(FactionId(2)),
        );
        world.add_road(Road::local(RoadId(9), LocationId(3), LocationId(9)));
        world.spawn_army(FactionId(1), 900, LocationId(3));
        world.spawn_army(FactionId(1), 600, LocationId(3));

        pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 5000, None);
        assert!(world.strength_at(LocationId(3), FactionId(1)) >= 1000);
    }

    #[test]
    fn test_floor_override_drains_named_source() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let army = world.spawn_army(FactionId(1), 1200, LocationId(2));

        let moved = pull_reinforcements(
            &mut world,
            &config,
            &mut ctx,
            LocationId(1),
            2000,
            Some(LocationId(2)),
        );
        assert_eq!(moved, 1200);
        assert_eq!(world.army(army).unwrap().location(), Some(LocationId(1)));
        assert_eq!(world.strength_at(LocationId(2), FactionId(1)), 0);
    }

    #[test]
    fn test_claimed_armies_ignored() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let army = world.spawn_army(FactionId(1), 900, LocationId(2));
        ctx.claim(army);

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 900, None);
        assert_eq!(moved, 0);
    }

    #[test]
    fn test_unreachable_source_skipped() {
        let mut world = pull_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.add_location(
            Location::new(LocationId(8), "Island", LocationKind::City)
                .with_faction(FactionId(1)),
        );
        world.spawn_army(FactionId(1), 2000, LocationId(8));

        let moved =
            pull_reinforcements(&mut world, &config, &mut ctx, LocationId(1), 2000, None);
        assert_eq!(moved, 0);
    }
}
