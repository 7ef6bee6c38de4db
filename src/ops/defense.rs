//! Defend and road-defense mission handling
//!
//! Defense is mostly about keeping enough strength in the right place:
//! garrison the target, break a siege when the odds are overwhelming, and
//! spread spare regiments over the approach roads.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId, RoadId, Strength};
use crate::missions::Mission;
use crate::ops::context::TurnContext;
use crate::ops::garrison::min_garrison;
use crate::ops::reinforce::pull_reinforcements;
use crate::world::road::RoadQuality;
use crate::world::{ArmyPosition, World};

/// Run one turn of a defend mission.
pub fn run_defend(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
) {
    let Some(target) = mission.target.location() else {
        return;
    };
    if world.location(target).is_none() {
        tracing::debug!(mission = ?mission.id, "defend target missing, skipping");
        return;
    }

    let wanted = (mission.required_strength as f32 * 1.2) as Strength;
    let defenders = world.strength_at(target, ctx.faction);
    let besiegers = world.besieger_strength_at(target, ctx.faction);

    if besiegers > 0 {
        // Overwhelming advantage over the siege lines is an automatic
        // sortie opportunity; the combat resolver takes it from there.
        if defenders as f32 > config.sortie_ratio * besiegers as f32 {
            let sortie: Vec<ArmyId> = world
                .armies_at(target)
                .filter(|a| a.faction == ctx.faction && !a.spent && !a.insurgent)
                .map(|a| a.id)
                .collect();
            for id in sortie {
                ctx.claim(id);
                if let Some(army) = world.army_mut(id) {
                    army.garrisoned = false;
                    army.committed = true;
                }
            }
            let name = world
                .location(target)
                .map(|l| l.name.clone())
                .unwrap_or_default();
            world.log.push(format!("The defenders of {} sortie against the besiegers!", name));
            return;
        }
    }

    if defenders < wanted {
        let deficit = wanted - defenders;
        if deficit > config.min_reinforce_deficit {
            pull_reinforcements(world, config, ctx, target, deficit, None);
        }
        return;
    }

    // Over-strength garrisons push pickets onto the approach roads.
    if defenders > wanted + config.max_screen_regiment {
        screen_adjacent_stages(world, config, ctx, target, defenders - wanted);
    }
}

/// Peel small regiments onto adjacent regional road stages that lack one.
fn screen_adjacent_stages(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    target: LocationId,
    mut surplus: Strength,
) {
    let roads: Vec<_> = world
        .roads_at(target)
        .filter(|r| r.quality == RoadQuality::Regional)
        .map(|r| r.id)
        .collect();

    for road_id in roads {
        if surplus < config.screen_regiment {
            return;
        }
        let Some(road) = world.road(road_id) else {
            continue;
        };
        let Some(direction) = road.direction_from(target) else {
            continue;
        };
        let stage = road.entry_stage(direction);
        let exit = road.exit_for(direction);
        if stage_has_screener(world, ctx, road_id, stage) {
            continue;
        }

        let Some(source) = world
            .armies_at(target)
            .filter(|a| a.faction == ctx.faction && a.mergeable() && !ctx.is_claimed(a.id))
            .filter(|a| a.strength > config.screen_regiment)
            .map(|a| a.id)
            .next()
        else {
            return;
        };
        let Ok(picket) = world.split_army(source, config.screen_regiment) else {
            continue;
        };
        ctx.claim(picket);
        if let Some(army) = world.army_mut(picket) {
            army.position = ArmyPosition::OnRoad {
                road: road_id,
                stage,
                direction,
                origin: target,
                destination: exit,
            };
            army.garrisoned = true;
        }
        surplus -= config.screen_regiment;
    }
}

fn stage_has_screener(world: &World, ctx: &TurnContext, road_id: RoadId, stage_idx: usize) -> bool {
    world.armies.values().any(|a| {
        a.faction == ctx.faction
            && matches!(
                a.position,
                ArmyPosition::OnRoad { road, stage, .. } if road == road_id && stage == stage_idx
            )
    })
}

/// Run one turn of a road-defense mission: every stage of the road gets a
/// screening regiment, drawn from whichever endpoint can spare one.
pub fn run_road_defense(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
) {
    let Some(road_id) = mission.target.road() else {
        return;
    };
    let Some(road) = world.road(road_id).cloned() else {
        tracing::debug!(mission = ?mission.id, "road-defense target missing, skipping");
        return;
    };

    for stage_idx in 0..road.stages.len() {
        if stage_has_screener(world, ctx, road_id, stage_idx) {
            continue;
        }
        // Draw from the nearer endpoint first.
        let midpoint = road.stages.len() / 2;
        let endpoints = if stage_idx < midpoint {
            [road.from, road.to]
        } else {
            [road.to, road.from]
        };
        'endpoint: for source_loc in endpoints {
            let floor = min_garrison(world, config, source_loc, ctx.faction);
            let candidates: Vec<(ArmyId, Strength)> = world
                .armies_at(source_loc)
                .filter(|a| a.faction == ctx.faction && a.mergeable() && !ctx.is_claimed(a.id))
                .map(|a| (a.id, a.strength))
                .collect();
            for (source, strength) in candidates {
                let total = world.strength_at(source_loc, ctx.faction);
                if total < floor + config.screen_regiment {
                    continue;
                }
                if strength <= config.screen_regiment {
                    continue;
                }
                let Ok(picket) = world.split_army(source, config.screen_regiment) else {
                    continue;
                };
                let Some(direction) = road.direction_from(source_loc) else {
                    continue;
                };
                ctx.claim(picket);
                if let Some(army) = world.army_mut(picket) {
                    army.position = ArmyPosition::OnRoad {
                        road: road_id,
                        stage: stage_idx,
                        direction,
                        origin: source_loc,
                        destination: road.exit_for(direction),
                    };
                    army.garrisoned = true;
                }
                break 'endpoint;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, MissionId, RoadId};
    use crate::missions::MissionStatus;
    use crate::world::{Faction, Location, LocationKind, Road};

    fn defense_world() -> World {
        let mut world = World::new();
        world.add_faction(Faction::new(FactionId(1), "Ardan"));
        world.add_faction(Faction::new(FactionId(2), "Velk"));
        world.add_location(
            Location::new(LocationId(1), "Fortress", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(10_000, 100),
        );
        world.add_location(
            Location::new(LocationId(2), "Depot", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(10_000, 100),
        );
        world.add_road(Road::local(RoadId(1), LocationId(2), LocationId(1)));
        world.add_road(Road::regional(RoadId(2), LocationId(1), LocationId(3), 2));
        world.add_location(
            Location::new(LocationId(3), "Marches", LocationKind::Rural)
                .with_faction(FactionId(1))
                .with_population(5_000, 100),
        );
        world
    }

    fn active_defend(required: Strength) -> Mission {
        let mut mission = Mission::defend(MissionId(1), LocationId(1), required);
        mission.status = MissionStatus::Active;
        mission
    }

    #[test]
    fn test_understrength_garrison_pulls_reinforcement() {
        let mut world = defense_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(1), 500, LocationId(1));
        let depot = world.spawn_army(FactionId(1), 2000, LocationId(2));
        let mut mission = active_defend(2000);

        run_defend(&mut world, &config, &mut ctx, &mut mission);
        // Depot keeps its 500 floor and sends the surplus.
        let depot_army = world.army(depot).unwrap();
        assert!(depot_army.location() == Some(LocationId(1)) || depot_army.garrisoned);
        assert!(world.strength_at(LocationId(2), FactionId(1)) >= 500);
    }

    #[test]
    fn test_sortie_when_besiegers_outmatched() {
        let mut world = defense_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let defender = world.spawn_army(FactionId(1), 1600, LocationId(1));
        world.army_mut(defender).unwrap().garrisoned = true;
        let besieger = world.spawn_army(FactionId(2), 1000, LocationId(1));
        world.army_mut(besieger).unwrap().sieging = true;
        let mut mission = active_defend(1000);

        run_defend(&mut world, &config, &mut ctx, &mut mission);
        assert!(!world.army(defender).unwrap().garrisoned);
        assert!(world.army(defender).unwrap().committed);
        assert!(world.log.iter().any(|l| l.contains("sortie")));
    }

    #[test]
    fn test_no_sortie_without_clear_advantage() {
        let mut world = defense_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        let defender = world.spawn_army(FactionId(1), 1200, LocationId(1));
        let besieger = world.spawn_army(FactionId(2), 1000, LocationId(1));
        world.army_mut(besieger).unwrap().sieging = true;
        let mut mission = active_defend(1000);

        run_defend(&mut world, &config, &mut ctx, &mut mission);
        assert!(!world.army(defender).unwrap().committed);
        assert!(world.log.is_empty());
    }

    #[test]
    fn test_overstrength_garrison_screens_roads() {
        let mut world = defense_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(1), 2500, LocationId(1));
        let mut mission = active_defend(1000);

        run_defend(&mut world, &config, &mut ctx, &mut mission);
        // A picket of 500 now sits on the regional road's entry stage.
        let picket = world.armies.values().find(|a| a.is_on_road()).unwrap();
        assert_eq!(picket.strength, config.screen_regiment);
        assert!(picket.garrisoned);
        assert_eq!(world.strength_at(LocationId(1), FactionId(1)), 2000);
    }

    #[test]
    fn test_road_defense_screens_every_stage() {
        let mut world = defense_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(1), 3000, LocationId(1));
        world.spawn_army(FactionId(1), 3000, LocationId(3));
        let mut mission = Mission::road_defense(MissionId(2), RoadId(2));
        mission.status = MissionStatus::Active;

        run_road_defense(&mut world, &config, &mut ctx, &mut mission);
        for stage_idx in 0..2 {
            assert!(
                stage_has_screener(&world, &ctx, RoadId(2), stage_idx),
                "stage {stage_idx} lacks a screener"
            );
        }
    }
}
