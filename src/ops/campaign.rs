//! Campaign mission handling
//!
//! Drives a campaign through gathering, marching, siege and assault. The
//! only backward transition is the zombie regression: an offense whose
//! committed strength has collapsed returns to gathering instead of
//! dribbling armies into a lost fight.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId, Strength};
use crate::missions::{CampaignMode, CampaignStage, Mission, MissionStatus};
use crate::ops::context::TurnContext;
use crate::ops::garrison::min_garrison;
use crate::ops::movement::begin_march;
use crate::ops::reinforce::pull_reinforcements;
use crate::ops::siege::resolve_siege_stage;
use crate::ops::threat::{combined_arrival, is_overmatched, location_threat};
use crate::world::World;

/// A planned contribution to a send-force: `take` soldiers out of `army`.
#[derive(Debug, Clone, Copy)]
struct ForceEntry {
    army: ArmyId,
    take: Strength,
    whole: bool,
}

/// Greedily pack unassigned armies at `staging` into a force of at most
/// `budget`, strongest first, splitting the overflowing army so the force
/// matches the budget exactly.
fn pack_force(
    world: &World,
    ctx: &TurnContext,
    staging: LocationId,
    budget: Strength,
) -> (Vec<ForceEntry>, Strength) {
    let mut pool: Vec<(ArmyId, Strength)> = world
        .armies_at(staging)
        .filter(|a| a.faction == ctx.faction && a.mergeable() && !ctx.is_claimed(a.id))
        .map(|a| (a.id, a.strength))
        .collect();
    pool.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut entries = Vec::new();
    let mut total: Strength = 0;
    for (army, strength) in pool {
        if total >= budget {
            break;
        }
        let remaining = budget - total;
        if strength <= remaining {
            entries.push(ForceEntry {
                army,
                take: strength,
                whole: true,
            });
            total += strength;
        } else {
            entries.push(ForceEntry {
                army,
                take: remaining,
                whole: false,
            });
            total += remaining;
        }
    }
    (entries, total)
}

/// Claim the packed force and march it at `target`, splitting partial
/// contributions off their parent armies.
fn launch_force(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    entries: &[ForceEntry],
    target: LocationId,
) {
    for entry in entries {
        let marcher = if entry.whole {
            entry.army
        } else {
            match world.split_army(entry.army, entry.take) {
                Ok(detached) => {
                    if let Some(rest) = world.army_mut(entry.army) {
                        rest.garrisoned = true;
                    }
                    detached
                }
                Err(_) => continue,
            }
        };
        if !ctx.claim(marcher) {
            continue;
        }
        if let Some(army) = world.army_mut(marcher) {
            army.committed = true;
        }
        begin_march(world, config, marcher, target);
    }
}

/// Strength committed to the offense: at the target plus en route to it.
fn committed_strength(world: &World, ctx: &TurnContext, target: LocationId) -> Strength {
    world.strength_at(target, ctx.faction) + world.strength_en_route(target, ctx.faction)
}

/// Force required to launch against the target's current garrison.
fn required_attack_force(world: &World, config: &OpsConfig, ctx: &TurnContext, target: LocationId) -> Strength {
    let enemy_garrison = world.enemy_strength_at(target, ctx.faction) as f32;
    let sized = (enemy_garrison * config.attack_force_ratio) as Strength;
    sized.clamp(config.min_attack_force, config.max_attack_force)
}

/// Freeze or resume every army of this faction marching on `target`.
fn set_march_frozen(world: &mut World, ctx: &TurnContext, target: LocationId, frozen: bool) {
    let marching: Vec<ArmyId> = world
        .armies
        .values()
        .filter(|a| a.faction == ctx.faction)
        .filter(|a| {
            matches!(
                a.position,
                crate::world::ArmyPosition::OnRoad { destination, .. } if destination == target
            )
        })
        .map(|a| a.id)
        .collect();
    for id in marching {
        if let Some(army) = world.army_mut(id) {
            army.garrisoned = frozen;
        }
    }
}

/// Advance-guard check shared by the moving and sieging stages. Returns
/// true when this turn's movement must halt.
fn advance_is_suicidal(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &Mission,
    target: LocationId,
    staging: Option<LocationId>,
) -> bool {
    let moving =
        world.strength_at(target, ctx.faction) + world.strength_en_route(target, ctx.faction);
    let threat = location_threat(world, config, target, ctx.faction);
    let defense = threat.effective_defense(config);
    let combined = combined_arrival(world, target, ctx.faction, 0)
        .max(moving);
    let overmatched = is_overmatched(config, defense, combined)
        || threat.static_bonus > moving;
    if overmatched {
        tracing::debug!(mission = ?mission.id, defense, moving, "advance halted, requesting reinforcement");
        set_march_frozen(world, ctx, target, true);
        let want = ((defense as f32) * 1.1).ceil() as Strength;
        let deficit = want.saturating_sub(moving);
        if deficit > 0 {
            pull_reinforcements(world, config, ctx, target, deficit, staging);
        }
    } else {
        set_march_frozen(world, ctx, target, false);
    }
    overmatched
}

/// Top-up request while the offense is underway.
fn continuous_reinforcement(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    target: LocationId,
    required: Strength,
    staging: Option<LocationId>,
) {
    let committed = committed_strength(world, ctx, target);
    if (committed as f32) < required as f32 * 1.1 {
        let want = (required as f32 * 1.2) as Strength;
        let deficit = want.saturating_sub(committed);
        if deficit > config.min_reinforce_deficit {
            pull_reinforcements(world, config, ctx, target, deficit, staging);
        }
    }
}

/// Run one turn of a campaign mission.
pub fn run_campaign(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
) {
    let Some(target) = mission.target.location() else {
        return;
    };
    if world.location(target).is_none() {
        tracing::debug!(mission = ?mission.id, "campaign target missing, skipping");
        return;
    }

    // Target already ours: the campaign is done.
    if world
        .location(target)
        .is_some_and(|l| l.is_held_by(ctx.faction))
    {
        mission.stage = CampaignStage::Completed;
        mission.status = MissionStatus::Completed;
        return;
    }

    // Zombie recovery: a collapsed offense regroups instead of feeding
    // stragglers into the target piecemeal.
    if mission.stage.is_active_offense() {
        let committed = committed_strength(world, ctx, target);
        let required = mission
            .mode
            .as_ref()
            .map(|m| m.required_strength())
            .unwrap_or(0);
        let viability = ((required as f32 * config.zombie_ratio) as Strength).max(500);
        if committed < viability {
            tracing::debug!(mission = ?mission.id, committed, viability, "zombie campaign, regressing to gathering");
            mission.stage = CampaignStage::Gathering;
        }
    }

    let Some(mode) = mission.mode.clone() else {
        return;
    };
    match mode {
        CampaignMode::SingleStaging {
            staging,
            required_strength,
        } => run_single(world, config, ctx, mission, target, staging, required_strength),
        CampaignMode::Convergent { .. } => run_convergent(world, config, ctx, mission, target),
    }
}

fn run_single(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
    target: LocationId,
    staging: LocationId,
    required: Strength,
) {
    if world.location(staging).is_none() {
        tracing::debug!(mission = ?mission.id, "staging point missing, skipping");
        return;
    }

    match mission.stage {
        CampaignStage::Gathering => {
            let floor = min_garrison(world, config, staging, ctx.faction);
            let available = world.strength_at(staging, ctx.faction);
            let surplus = available.saturating_sub(floor);
            let (entries, send_force) = pack_force(world, ctx, staging, surplus);

            let min_attack = required_attack_force(world, config, ctx, target);
            let at_target = world.strength_at(target, ctx.faction);
            let launch = send_force >= min_attack
                || at_target > 500
                || send_force > config.mass_override_force;

            if launch {
                launch_force(world, config, ctx, &entries, target);
                mission.stage = CampaignStage::Moving;
            } else {
                let deficit = required.saturating_sub(available);
                if deficit > config.min_reinforce_deficit {
                    pull_reinforcements(world, config, ctx, staging, deficit, None);
                }
            }
        }
        CampaignStage::Moving => {
            if advance_is_suicidal(world, config, ctx, mission, target, Some(staging)) {
                return;
            }
            continuous_reinforcement(world, config, ctx, target, required, Some(staging));
            // Late arrivals at the staging point follow the main force.
            let floor = min_garrison(world, config, staging, ctx.faction);
            let surplus = world
                .strength_at(staging, ctx.faction)
                .saturating_sub(floor);
            let (entries, _) = pack_force(world, ctx, staging, surplus);
            launch_force(world, config, ctx, &entries, target);

            if world.strength_at(target, ctx.faction) > 0 {
                mission.stage = CampaignStage::Sieging;
            }
        }
        CampaignStage::Sieging => {
            if advance_is_suicidal(world, config, ctx, mission, target, Some(staging)) {
                return;
            }
            continuous_reinforcement(world, config, ctx, target, required, Some(staging));
            resolve_siege_stage(world, config, ctx, mission, target);
        }
        CampaignStage::Assaulting => {
            // Keep the assault force claimed and in the fight; the combat
            // resolver settles the outcome.
            let attackers: Vec<ArmyId> = world
                .armies_at(target)
                .filter(|a| a.faction == ctx.faction && !a.sieging)
                .map(|a| a.id)
                .collect();
            for id in attackers {
                ctx.claim(id);
                if let Some(army) = world.army_mut(id) {
                    army.garrisoned = false;
                    army.committed = true;
                }
            }
            continuous_reinforcement(world, config, ctx, target, required, Some(staging));
        }
        CampaignStage::Completed => {}
    }
}

fn run_convergent(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
    target: LocationId,
) {
    let Some(CampaignMode::Convergent {
        stagings,
        required_strength,
        ..
    }) = mission.mode.clone()
    else {
        return;
    };
    if stagings.len() < 2 {
        tracing::debug!(mission = ?mission.id, "convergent campaign needs two staging points, skipping");
        return;
    }
    let required = required_strength;

    match mission.stage {
        CampaignStage::Gathering => {
            let share = required / stagings.len() as Strength;
            let threshold = (share as f32 * config.readiness_threshold) as Strength;
            let mut all_ready = true;

            let mut readiness = Vec::with_capacity(stagings.len());
            for &staging in &stagings {
                let uncommitted: Strength = world
                    .armies_at(staging)
                    .filter(|a| a.faction == ctx.faction && a.mergeable() && !ctx.is_claimed(a.id))
                    .map(|a| a.strength)
                    .sum();
                let ready = uncommitted >= threshold;
                readiness.push((staging, ready));
                if !ready {
                    all_ready = false;
                    let shortfall = share.saturating_sub(uncommitted);
                    if shortfall > config.min_reinforce_deficit {
                        pull_reinforcements(world, config, ctx, staging, shortfall, None);
                    }
                }
            }

            if let Some(CampaignMode::Convergent { ready, .. }) = mission.mode.as_mut() {
                ready.clear();
                for (staging, is_ready) in &readiness {
                    ready.insert(*staging, *is_ready);
                }
            }

            // Synchronized launch: every point clears the bar in the same
            // turn, or nobody marches.
            if all_ready {
                for &staging in &stagings {
                    let columns: Vec<ArmyId> = world
                        .armies_at(staging)
                        .filter(|a| {
                            a.faction == ctx.faction
                                && a.mergeable()
                                && !ctx.is_claimed(a.id)
                                && a.strength >= config.min_launch_army
                        })
                        .map(|a| a.id)
                        .collect();
                    for id in columns {
                        if !ctx.claim(id) {
                            continue;
                        }
                        if let Some(army) = world.army_mut(id) {
                            army.committed = true;
                        }
                        begin_march(world, config, id, target);
                    }
                }
                mission.stage = CampaignStage::Moving;
            }
        }
        CampaignStage::Moving => {
            // Once launched each column pathfinds independently; only the
            // shared advance guard still applies.
            if advance_is_suicidal(world, config, ctx, mission, target, None) {
                return;
            }
            continuous_reinforcement(world, config, ctx, target, required, None);
            if world.strength_at(target, ctx.faction) > 0 {
                mission.stage = CampaignStage::Sieging;
            }
        }
        CampaignStage::Sieging => {
            if advance_is_suicidal(world, config, ctx, mission, target, None) {
                return;
            }
            continuous_reinforcement(world, config, ctx, target, required, None);
            resolve_siege_stage(world, config, ctx, mission, target);
        }
        CampaignStage::Assaulting => {
            let attackers: Vec<ArmyId> = world
                .armies_at(target)
                .filter(|a| a.faction == ctx.faction && !a.sieging)
                .map(|a| a.id)
                .collect();
            for id in attackers {
                ctx.claim(id);
                if let Some(army) = world.army_mut(id) {
                    army.garrisoned = false;
                    army.committed = true;
                }
            }
        }
        CampaignStage::Completed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FactionId, MissionId, RoadId};
    use crate::world::{Faction, Location, LocationKind, Road};

    fn campaign_world() -> World {
        let mut world = World::new();
        world.add_faction(Faction::new(FactionId(1), "Ardan").with_gold(500));
        world.add_faction(Faction::new(FactionId(2), "Velk"));
        world.add_location(
            Location::new(LocationId(1), "Staging", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(10_000, 100),
        );
        world.add_location(
            Location::new(LocationId(2), "Target", LocationKind::City)
                .with_faction(FactionId(2))
                .with_fortification(2),
        );
        world.add_road(Road::regional(RoadId(1), LocationId(1), LocationId(2), 1));
        world
    }

    #[test]
    fn test_gathering_launches_at_computed_requirement() {
        // Fort 2, garrison 600: requirement clamps up to 1000, and 1800 at
        // the staging point clears it.
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(2), 600, LocationId(2));
        world.spawn_army(FactionId(1), 1800, LocationId(1));
        // Keep the staging floor covered so the whole force may leave.
        world.spawn_army(FactionId(1), 500, LocationId(1));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 2000);
        mission.status = MissionStatus::Active;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.stage, CampaignStage::Moving);
        assert!(world.strength_en_route(LocationId(2), FactionId(1)) >= 1000);
    }

    #[test]
    fn test_gathering_waits_below_requirement() {
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(2), 600, LocationId(2));
        world.spawn_army(FactionId(1), 900, LocationId(1));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 2000);
        mission.status = MissionStatus::Active;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.stage, CampaignStage::Gathering);
        assert_eq!(world.strength_en_route(LocationId(2), FactionId(1)), 0);
    }

    #[test]
    fn test_moving_halts_when_overmatched() {
        // 500 en route against 600 defenders behind level-2 walls: the
        // 1400 effective defense forces a halt.
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(2), 600, LocationId(2));
        let column = world.spawn_army(FactionId(1), 500, LocationId(1));
        begin_march(&mut world, &config, column, LocationId(2));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 1000);
        mission.status = MissionStatus::Active;
        mission.stage = CampaignStage::Moving;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.stage, CampaignStage::Moving);
        assert!(world.army(column).unwrap().garrisoned);
    }

    #[test]
    fn test_zombie_offense_regresses_to_gathering() {
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(2), 600, LocationId(2));
        // A token 100-man column cannot carry a 2000-strength campaign.
        let column = world.spawn_army(FactionId(1), 100, LocationId(1));
        begin_march(&mut world, &config, column, LocationId(2));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 2000);
        mission.status = MissionStatus::Active;
        mission.stage = CampaignStage::Moving;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.stage, CampaignStage::Gathering);
    }

    #[test]
    fn test_captured_target_completes_mission() {
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.location_mut(LocationId(2)).unwrap().faction = Some(FactionId(1));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 2000);
        mission.status = MissionStatus::Active;
        mission.stage = CampaignStage::Sieging;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.status, MissionStatus::Completed);
        assert_eq!(mission.stage, CampaignStage::Completed);
    }

    #[test]
    fn test_arrival_advances_to_sieging() {
        let mut world = campaign_world();
        let config = OpsConfig::default();
        let mut ctx = TurnContext::new(FactionId(1));
        world.spawn_army(FactionId(2), 600, LocationId(2));
        world.spawn_army(FactionId(1), 2500, LocationId(2));
        let mut mission = Mission::campaign(MissionId(1), LocationId(2), LocationId(1), 2000);
        mission.status = MissionStatus::Active;
        mission.stage = CampaignStage::Moving;

        run_campaign(&mut world, &config, &mut ctx, &mut mission);
        assert_eq!(mission.stage, CampaignStage::Sieging);
    }

    mod convergent {
        use super::*;

        fn convergent_world() -> World {
            let mut world = campaign_world();
            world.add_location(
                Location::new(LocationId(3), "Second Staging", LocationKind::City)
                    .with_faction(FactionId(1))
                    .with_population(10_000, 100),
            );
            world.add_road(Road::regional(RoadId(2), LocationId(3), LocationId(2), 1));
            world
        }

        #[test]
        fn test_launch_requires_every_point_ready() {
            let mut world = convergent_world();
            let config = OpsConfig::default();
            let mut ctx = TurnContext::new(FactionId(1));
            world.spawn_army(FactionId(2), 600, LocationId(2));
            // Share is 1000 each; point A clears 70%, point B does not.
            world.spawn_army(FactionId(1), 900, LocationId(1));
            world.spawn_army(FactionId(1), 300, LocationId(3));
            let mut mission = Mission::convergent_campaign(
                MissionId(1),
                LocationId(2),
                vec![LocationId(1), LocationId(3)],
                2000,
            );
            mission.status = MissionStatus::Active;

            run_campaign(&mut world, &config, &mut ctx, &mut mission);
            assert_eq!(mission.stage, CampaignStage::Gathering);
            assert_eq!(world.strength_en_route(LocationId(2), FactionId(1)), 0);
            match mission.mode.as_ref().unwrap() {
                CampaignMode::Convergent { ready, .. } => {
                    assert_eq!(ready.get(&LocationId(1)), Some(&true));
                    assert_eq!(ready.get(&LocationId(3)), Some(&false));
                }
                _ => panic!("expected convergent mode"),
            }
        }

        #[test]
        fn test_synchronized_launch_commits_all_points() {
            let mut world = convergent_world();
            let config = OpsConfig::default();
            let mut ctx = TurnContext::new(FactionId(1));
            world.spawn_army(FactionId(2), 600, LocationId(2));
            world.spawn_army(FactionId(1), 900, LocationId(1));
            world.spawn_army(FactionId(1), 800, LocationId(3));
            // A 150-man band is below the launch minimum and stays home.
            let tiny = world.spawn_army(FactionId(1), 150, LocationId(3));
            let mut mission = Mission::convergent_campaign(
                MissionId(1),
                LocationId(2),
                vec![LocationId(1), LocationId(3)],
                2000,
            );
            mission.status = MissionStatus::Active;

            run_campaign(&mut world, &config, &mut ctx, &mut mission);
            assert_eq!(mission.stage, CampaignStage::Moving);
            assert_eq!(
                world.strength_en_route(LocationId(2), FactionId(1)),
                1700
            );
            assert_eq!(world.army(tiny).unwrap().location(), Some(LocationId(3)));
        }

        #[test]
        fn test_two_point_minimum_enforced() {
            let mut world = convergent_world();
            let config = OpsConfig::default();
            let mut ctx = TurnContext::new(FactionId(1));
            world.spawn_army(FactionId(1), 3000, LocationId(1));
            let mut mission = Mission::convergent_campaign(
                MissionId(1),
                LocationId(2),
                vec![LocationId(1)],
                2000,
            );
            mission.status = MissionStatus::Active;

            run_campaign(&mut world, &config, &mut ctx, &mut mission);
            assert_eq!(mission.stage, CampaignStage::Gathering);
        }
    }
}
