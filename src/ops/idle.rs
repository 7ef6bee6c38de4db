//! Idle-army handling
//!
//! Armies no mission claimed this turn still need somewhere useful to be:
//! hold the home garrison, drift toward an active campaign, or man a
//! strategic point. Armies out on the roads get the convergence-aware
//! suicide check before they blunder into a prepared defense.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId, RoadId};
use crate::missions::{CampaignMode, CampaignStage, Mission, MissionKind, MissionStatus};
use crate::ops::context::TurnContext;
use crate::ops::distance::hop_distance;
use crate::ops::garrison::min_garrison;
use crate::ops::movement::{begin_march, reverse_march};
use crate::ops::threat::{combined_arrival, is_overmatched, location_threat, stage_threat};
use crate::world::{ArmyPosition, World};

/// Run idle handling for every unclaimed army of the context's faction.
pub fn run_idle(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    missions: &[Mission],
) {
    redeploy_stationed(world, config, ctx, missions);
    resolve_road_armies(world, config, ctx);
}

/// Stationed idle armies: garrison, or march somewhere worth being.
fn redeploy_stationed(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    missions: &[Mission],
) {
    // Strongest armies redeploy first; the remainder holds the floor.
    let mut idle: Vec<(ArmyId, LocationId, u32)> = world
        .armies
        .values()
        .filter(|a| a.faction == ctx.faction && a.is_idle() && !ctx.is_claimed(a.id))
        .filter_map(|a| a.location().map(|loc| (a.id, loc, a.strength)))
        .collect();
    idle.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    for (army_id, home, _) in idle {
        let Some(strength) = world.army(army_id).map(|a| a.strength) else {
            continue;
        };

        // Leaving must not breach the home floor.
        let floor = min_garrison(world, config, home, ctx.faction);
        let remainder = world.strength_at(home, ctx.faction).saturating_sub(strength);
        if remainder < floor {
            if let Some(army) = world.army_mut(army_id) {
                army.garrisoned = true;
            }
            continue;
        }

        if let Some(goal) = nearest_campaign_goal(world, config, missions, home)
            .or_else(|| nearest_deploy_point(world, config, ctx, home))
        {
            if ctx.claim(army_id) {
                begin_march(world, config, army_id, goal);
            }
        }
    }
}

/// Closest active campaign's staging or target within pull range.
fn nearest_campaign_goal(
    world: &World,
    config: &OpsConfig,
    missions: &[Mission],
    from: LocationId,
) -> Option<LocationId> {
    missions
        .iter()
        .filter(|m| m.kind == MissionKind::Campaign && m.status == MissionStatus::Active)
        .filter_map(|m| {
            let goal = match (&m.mode, m.stage) {
                (Some(CampaignMode::SingleStaging { staging, .. }), CampaignStage::Gathering) => {
                    *staging
                }
                (Some(CampaignMode::Convergent { stagings, .. }), CampaignStage::Gathering) => {
                    // Rally at whichever staging point is closest.
                    stagings
                        .iter()
                        .copied()
                        .min_by_key(|s| hop_distance(world, from, *s).unwrap_or(u32::MAX))?
                }
                _ => m.target.location()?,
            };
            let dist = hop_distance(world, from, goal)?;
            (dist < config.campaign_pull_range && goal != from).then_some((dist, goal))
        })
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, goal)| goal)
}

/// Closest faction-held strategic point within deployment range.
fn nearest_deploy_point(
    world: &World,
    config: &OpsConfig,
    ctx: &TurnContext,
    from: LocationId,
) -> Option<LocationId> {
    world
        .locations
        .values()
        .filter(|l| l.strategic && l.is_held_by(ctx.faction) && l.id != from)
        .filter_map(|l| hop_distance(world, from, l.id).map(|d| (d, l.id)))
        .filter(|(d, _)| *d <= config.deploy_point_range)
        .min_by_key(|(d, id)| (*d, *id))
        .map(|(_, id)| id)
}

/// Armies on the roads: freeze, reverse, or let them march on, judged by
/// the combined strength arriving with them.
fn resolve_road_armies(world: &mut World, config: &OpsConfig, ctx: &mut TurnContext) {
    let on_road: Vec<ArmyId> = world
        .armies
        .values()
        .filter(|a| a.faction == ctx.faction && a.is_on_road() && !a.insurgent)
        .filter(|a| !ctx.is_claimed(a.id))
        .map(|a| a.id)
        .collect();

    for army_id in on_road {
        let Some(army) = world.army(army_id) else {
            continue;
        };
        let ArmyPosition::OnRoad {
            road: road_id,
            stage,
            direction,
            ..
        } = army.position
        else {
            continue;
        };
        let stalled = army.garrisoned;
        let strength = army.strength;
        let Some(road) = world.road(road_id) else {
            continue;
        };

        // Threat at whatever comes next: another stage, or the road's end.
        let (defense, combined) = match road.next_stage(stage, direction) {
            Some(next) => {
                let threat = stage_threat(world, config, road_id, next, ctx.faction);
                let accompanying = same_stage_strength(world, ctx, road_id, next, army_id);
                (threat.effective_defense(config), strength + accompanying)
            }
            None => {
                let dest = road.exit_for(direction);
                let threat = location_threat(world, config, dest, ctx.faction);
                // A stalled army is invisible to the arrival projection;
                // count it back in.
                let extra = if stalled { strength } else { 0 };
                (
                    threat.effective_defense(config),
                    combined_arrival(world, dest, ctx.faction, extra),
                )
            }
        };

        if is_overmatched(config, defense, combined) {
            if stalled {
                tracing::debug!(?army_id, defense, combined, "stalled army turning back");
                reverse_march(world, army_id);
            } else {
                tracing::debug!(?army_id, defense, combined, "army frozen short of a prepared defense");
                if let Some(army) = world.army_mut(army_id) {
                    army.garrisoned = true;
                }
            }
            ctx.claim(army_id);
        } else if stalled {
            // The way ahead is clear again; resume the march.
            if let Some(army) = world.army_mut(army_id) {
                army.garrisoned = false;
            }
        }
    }
}

/// Strength of other same-faction armies advancing into the same stage.
fn same_stage_strength(
    world: &World,
    ctx: &TurnContext,
    road_id: RoadId,
    stage_idx: usize,
    except: ArmyId,
) -> u32 {
    world
        .armies
        .values()
        .filter(|a| a.faction == ctx.faction && a.id != except && !a.garrisoned)
        .filter(|a| {
            matches!(
                a.position,
                ArmyPosition::OnRoad { road, stage, direction, .. }
                    if road == road_id
                        && world
                            .road(road_id)
                            .and_then(|r| r.next_stage(stage, direction))
                            == Some(stage_idx)
            )
        })
        .map(|a| a.strength)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, MissionId, RoadId};
    use crate::world::{Faction, Location, LocationKind, Road};

    fn idle_world() -> World {
        let mut world = World::new();
        world.add_faction(Faction::new(FactionId(1), "Ardan"));
        world.add_faction(Faction::new(FactionId(2), "Velk"));
        for (id, name) in [(1, "Home"), (2, "Staging"), (3, "Target")] {
            world.add_location(
                Location::new(LocationId(id), name, LocationKind::City)
                    .with_faction(FactionId(1))
                    .with_population(10_000, 100),
            );
        }
        world.add_road(Road::local(RoadId(1), LocationId(1), LocationId(2)));
        world.add_road(Road::regional(RoadId(2), LocationId(2), LocationId(3), 1));
        world
    }

    #[test]
    fn test_last_defender_garrisons_instead_of_leaving() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let army = world.spawn_army(FactionId(1), 600, LocationId(1));
        let mission = {
            let mut m = Mission::campaign(MissionId(1), LocationId(3), LocationId(2), 1000);
            m.status = MissionStatus::Active;
            m
        };

        run_idle(&mut world, &config, &mut ctx, &[mission]);
        let army = world.army(army).unwrap();
        assert!(army.garrisoned);
        assert_eq!(army.location(), Some(LocationId(1)));
    }

    #[test]
    fn test_surplus_army_marches_to_campaign_staging() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(1), 600, LocationId(1));
        let surplus = world.spawn_army(FactionId(1), 900, LocationId(1));
        let mission = {
            let mut m = Mission::campaign(MissionId(1), LocationId(3), LocationId(2), 1000);
            m.status = MissionStatus::Active;
            m
        };

        run_idle(&mut world, &config, &mut ctx, &[mission]);
        assert_eq!(world.army(surplus).unwrap().location(), Some(LocationId(2)));
    }

    #[test]
    fn test_army_falls_back_to_strategic_point() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.location_mut(LocationId(2)).unwrap().strategic = true;
        world.spawn_army(FactionId(1), 600, LocationId(1));
        let surplus = world.spawn_army(FactionId(1), 900, LocationId(1));

        run_idle(&mut world, &config, &mut ctx, &[]);
        assert_eq!(world.army(surplus).unwrap().location(), Some(LocationId(2)));
    }

    #[test]
    fn test_lone_column_frozen_before_prepared_defense() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        // Target falls to the enemy and is heavily held.
        world.location_mut(LocationId(3)).unwrap().faction = Some(FactionId(2));
        world.location_mut(LocationId(3)).unwrap().fortification = 2;
        world.spawn_army(FactionId(2), 600, LocationId(3));
        let column = world.spawn_army(FactionId(1), 400, LocationId(2));
        begin_march(&mut world, &config, column, LocationId(3));

        run_idle(&mut world, &config, &mut ctx, &[]);
        let column = world.army(column).unwrap();
        assert!(column.garrisoned);
        assert!(column.is_on_road());
    }

    #[test]
    fn test_combined_columns_advance_together() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.location_mut(LocationId(3)).unwrap().faction = Some(FactionId(2));
        world.location_mut(LocationId(3)).unwrap().fortification = 2;
        world.spawn_army(FactionId(2), 600, LocationId(3));
        // Individually each column is outmatched by the 1400 effective
        // defense; together 1000 is enough to stay above the 1.5 ratio.
        let a = world.spawn_army(FactionId(1), 500, LocationId(2));
        let b = world.spawn_army(FactionId(1), 500, LocationId(2));
        begin_march(&mut world, &config, a, LocationId(3));
        begin_march(&mut world, &config, b, LocationId(3));

        run_idle(&mut world, &config, &mut ctx, &[]);
        assert!(!world.army(a).unwrap().garrisoned);
        assert!(!world.army(b).unwrap().garrisoned);
    }

    #[test]
    fn test_stalled_column_reverses_when_still_overmatched() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.location_mut(LocationId(3)).unwrap().faction = Some(FactionId(2));
        world.location_mut(LocationId(3)).unwrap().fortification = 2;
        world.spawn_army(FactionId(2), 600, LocationId(3));
        let column = world.spawn_army(FactionId(1), 400, LocationId(2));
        begin_march(&mut world, &config, column, LocationId(3));
        world.army_mut(column).unwrap().garrisoned = true;

        run_idle(&mut world, &config, &mut ctx, &[]);
        match world.army(column).unwrap().position {
            ArmyPosition::OnRoad { destination, .. } => {
                assert_eq!(destination, LocationId(2));
            }
            _ => panic!("expected army still on road"),
        }
    }

    #[test]
    fn test_stalled_column_resumes_when_clear() {
        let mut world = idle_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let column = world.spawn_army(FactionId(1), 400, LocationId(2));
        begin_march(&mut world, &config, column, LocationId(3));
        world.army_mut(column).unwrap().garrisoned = true;

        run_idle(&mut world, &config, &mut ctx, &[]);
        assert!(!world.army(column).unwrap().garrisoned);
    }
}
