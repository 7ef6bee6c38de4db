//! Siege decision and execution
//!
//! Decides whether a fortified target must be reduced before an assault,
//! whether negotiation should be tried instead, and conducts one siege
//! action: gold is spent, a wall level comes down, and a detachment is
//! pinned as the besieging force.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, LocationId, Strength};
use crate::missions::{CampaignStage, Mission};
use crate::ops::context::TurnContext;
use crate::ops::distance::hop_distance;
use crate::ops::threat::location_threat;
use crate::world::world::SiegeNotice;
use crate::world::{Capability, LocationKind, World};

/// Does taking this target require siege works rather than direct assault?
fn siege_required(
    world: &World,
    config: &OpsConfig,
    target: LocationId,
    attacker_strength: Strength,
    ctx: &TurnContext,
) -> bool {
    let Some(location) = world.location(target) else {
        return false;
    };
    if location.fortification == 0 {
        return false;
    }
    let garrison = world.enemy_strength_at(target, ctx.faction);
    let defense = location_threat(world, config, target, ctx.faction).effective_defense(config);
    garrison >= 500 || attacker_strength <= defense
}

/// Is there a food-surplus city near the target to negotiate through?
fn food_surplus_city_nearby(world: &World, config: &OpsConfig, target: LocationId) -> bool {
    world.locations.values().any(|loc| {
        loc.kind == LocationKind::City
            && loc.food >= config.food_surplus_min
            && hop_distance(world, target, loc.id)
                .is_some_and(|d| d <= config.negotiate_search_radius)
    })
}

/// Largest attacking army at the target still free to man the siege works.
fn largest_attacker(world: &World, ctx: &TurnContext, target: LocationId) -> Option<(ArmyId, Strength)> {
    world
        .armies_at(target)
        .filter(|a| a.faction == ctx.faction && !a.sieging && !a.insurgent && !a.spent)
        .map(|a| (a.id, a.strength))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
}

/// Resolve the sieging stage of a campaign for one turn.
///
/// Falls through to the non-siege branch when gold or manpower is short;
/// running out of money is not an error, just a slower war.
pub fn resolve_siege_stage(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
    target: LocationId,
) {
    let attacker_strength: Strength = world
        .armies_at(target)
        .filter(|a| a.faction == ctx.faction && !a.sieging)
        .map(|a| a.strength)
        .sum();
    if attacker_strength == 0 {
        return;
    }

    if siege_required(world, config, target, attacker_strength, ctx) {
        // Neutral settlements near a granary are worth talking to first;
        // the negotiation itself happens upstream.
        let neutral = world.location(target).is_some_and(|l| l.is_neutral());
        let diplomatic = world
            .factions
            .get(&ctx.faction)
            .is_some_and(|f| f.diplomatic);
        if neutral && diplomatic && food_surplus_city_nearby(world, config, target) {
            tracing::debug!(mission = ?mission.id, ?target, "negotiation preferred, siege skipped");
            return;
        }

        if execute_siege(world, config, ctx, target, attacker_strength) {
            after_siege_assessment(world, config, ctx, mission, target);
            return;
        }
    }

    non_siege_resolution(world, config, ctx, mission, target, attacker_strength);
}

/// Spend gold, knock a wall level down, pin a besieging detachment.
/// Returns false when gold or manpower is insufficient.
fn execute_siege(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    target: LocationId,
    attacker_strength: Strength,
) -> bool {
    let Some(fortification) = world.location(target).map(|l| l.fortification) else {
        return false;
    };
    let mut cost = config.siege_cost(fortification);
    if world.capability_present(target, ctx.faction, Capability::SiegeCostReduction) {
        cost /= 2;
    }
    let manpower = config.siege_manpower_for(fortification);

    let gold = world.factions.get(&ctx.faction).map(|f| f.gold).unwrap_or(0);
    if gold < cost || attacker_strength < manpower {
        return false;
    }
    let Some((army_id, strength)) = largest_attacker(world, ctx, target) else {
        return false;
    };

    let besieger = if strength > manpower {
        match world.split_army(army_id, manpower) {
            Ok(detached) => detached,
            Err(_) => army_id,
        }
    } else {
        army_id
    };

    if let Some(faction) = world.factions.get_mut(&ctx.faction) {
        faction.gold -= cost;
    }
    if let Some(location) = world.location_mut(target) {
        location.fortification -= 1;
    }
    ctx.claim(besieger);
    if let Some(army) = world.army_mut(besieger) {
        army.sieging = true;
        army.committed = true;
    }

    let attacker_name = world
        .factions
        .get(&ctx.faction)
        .map(|f| f.name.clone())
        .unwrap_or_default();
    let (target_name, new_level, defender) = world
        .location(target)
        .map(|l| (l.name.clone(), l.fortification, l.faction))
        .unwrap_or_default();
    world.log.push(format!(
        "{} lays siege to {}! Defenses reduce to Level {}.",
        attacker_name, target_name, new_level
    ));
    if defender
        .and_then(|f| world.factions.get(&f))
        .is_some_and(|f| f.human)
    {
        world.notices.push(SiegeNotice {
            target,
            target_name,
            attacker_name,
        });
    }
    true
}

/// After a siege action: storm now, or dig in as extra garrison?
fn after_siege_assessment(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
    target: LocationId,
) {
    let remaining: Strength = world
        .armies_at(target)
        .filter(|a| a.faction == ctx.faction && !a.sieging)
        .map(|a| a.strength)
        .sum();
    let garrison = world.enemy_strength_at(target, ctx.faction);
    let new_bonus = world
        .location(target)
        .map(|l| l.defense_bonus(config.bonus_per_fort_level))
        .unwrap_or(0);

    if remaining > garrison + new_bonus {
        mission.stage = CampaignStage::Assaulting;
        let released: Vec<ArmyId> = world
            .armies_at(target)
            .filter(|a| a.faction == ctx.faction && !a.sieging)
            .map(|a| a.id)
            .collect();
        for id in released {
            ctx.claim(id);
            if let Some(army) = world.army_mut(id) {
                army.garrisoned = false;
                army.committed = true;
            }
        }
    } else {
        // Not enough to storm the breach yet; the spare troops hold the
        // camp alongside the siege works.
        let holding: Vec<ArmyId> = world
            .armies_at(target)
            .filter(|a| a.faction == ctx.faction && !a.sieging)
            .map(|a| a.id)
            .collect();
        for id in holding {
            ctx.claim(id);
            if let Some(army) = world.army_mut(id) {
                army.garrisoned = true;
            }
        }
    }
}

/// Direct-assault branch for unfortified or overwhelmed targets.
fn non_siege_resolution(
    world: &mut World,
    config: &OpsConfig,
    ctx: &mut TurnContext,
    mission: &mut Mission,
    target: LocationId,
    attacker_strength: Strength,
) {
    let fortification = world
        .location(target)
        .map(|l| l.fortification)
        .unwrap_or(0);
    let defense = location_threat(world, config, target, ctx.faction).effective_defense(config);
    if fortification == 0 || attacker_strength as f32 > (defense + 2000) as f32 * 1.5 {
        mission.stage = CampaignStage::Assaulting;
        let released: Vec<ArmyId> = world
            .armies_at(target)
            .filter(|a| a.faction == ctx.faction && !a.sieging)
            .map(|a| a.id)
            .collect();
        for id in released {
            ctx.claim(id);
            if let Some(army) = world.army_mut(id) {
                army.garrisoned = false;
                army.committed = true;
            }
        }
    }
}
