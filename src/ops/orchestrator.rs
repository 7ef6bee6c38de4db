//! Per-faction military pass
//!
//! One call runs a faction's whole turn: urgent recalls, missions in
//! priority order, idle redeployment, then consolidation. Factions are
//! processed strictly sequentially by the caller against the live world;
//! the turn context's assigned set is the only double-commitment guard.

use crate::core::config::OpsConfig;
use crate::core::types::{ArmyId, FactionId, LocationId};
use crate::missions::{Mission, MissionKind, MissionStatus};
use crate::ops::campaign::run_campaign;
use crate::ops::context::TurnContext;
use crate::ops::defense::{run_defend, run_road_defense};
use crate::ops::idle::run_idle;
use crate::ops::movement::reverse_march;
use crate::world::{ArmyPosition, World};

/// Run one faction's military operations for this turn.
///
/// Missions are mutated in place; that is how results flow back to the
/// strategy layer.
pub fn run_faction_turn(
    world: &mut World,
    config: &OpsConfig,
    faction: FactionId,
    missions: &mut [Mission],
) {
    let mut ctx = TurnContext::new(faction);

    // Commitment is per turn; last turn's marks are stale.
    for army in world.armies.values_mut() {
        if army.faction == faction {
            army.committed = false;
        }
    }

    recall_threatened_columns(world, &mut ctx);

    // Campaigns outrank defense, defense outranks road watch.
    let mut order: Vec<usize> = (0..missions.len()).collect();
    order.sort_by(|&a, &b| {
        let ma = &missions[a];
        let mb = &missions[b];
        mb.kind
            .priority()
            .cmp(&ma.kind.priority())
            .then_with(|| mb.priority.cmp(&ma.priority))
    });

    for idx in order {
        let mission = &mut missions[idx];
        if matches!(mission.status, MissionStatus::Completed | MissionStatus::Failed) {
            continue;
        }
        if mission.status == MissionStatus::Planning {
            mission.status = MissionStatus::Active;
        }
        match mission.kind {
            MissionKind::Campaign => run_campaign(world, config, &mut ctx, mission),
            MissionKind::Defend => run_defend(world, config, &mut ctx, mission),
            MissionKind::RoadDefense => run_road_defense(world, config, &mut ctx, mission),
        }
    }

    run_idle(world, config, &mut ctx, missions);
    consolidate(world, config, &mut ctx);
    world.remove_dead();
}

/// An army marching away from a home base about to fall turns around.
fn recall_threatened_columns(world: &mut World, ctx: &mut TurnContext) {
    let columns: Vec<(ArmyId, LocationId)> = world
        .armies
        .values()
        .filter(|a| a.faction == ctx.faction && !a.insurgent)
        .filter_map(|a| match a.position {
            ArmyPosition::OnRoad { origin, .. } => Some((a.id, origin)),
            _ => None,
        })
        .collect();

    for (army_id, origin) in columns {
        let home_held = world
            .location(origin)
            .is_some_and(|l| l.is_held_by(ctx.faction));
        if !home_held {
            continue;
        }
        let defenders = world.strength_at(origin, ctx.faction);
        let attackers = world.enemy_strength_at(origin, ctx.faction);
        if attackers > defenders {
            tracing::debug!(?army_id, ?origin, "home base threatened, column recalled");
            reverse_march(world, army_id);
            ctx.claim(army_id);
        }
    }
}

/// Merge crowded stacks of eligible armies into a single field army.
fn consolidate(world: &mut World, config: &OpsConfig, ctx: &mut TurnContext) {
    let mut by_location: ahash::AHashMap<LocationId, Vec<ArmyId>> = ahash::AHashMap::new();
    for army in world.armies.values() {
        if army.faction != ctx.faction || !army.mergeable() || ctx.is_claimed(army.id) {
            continue;
        }
        if let Some(loc) = army.location() {
            by_location.entry(loc).or_default().push(army.id);
        }
    }

    for (loc, mut ids) in by_location {
        if ids.len() < config.consolidation_threshold {
            continue;
        }
        ids.sort_unstable();
        if let Some(merged) = world.merge_armies(&ids) {
            ctx.claim(merged);
            tracing::debug!(?loc, count = ids.len(), ?merged, "stacks consolidated");
        }
    }
}
