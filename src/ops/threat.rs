//! Convergence-aware threat assessment
//!
//! One threat model shared by the campaign advance guard and the idle-army
//! handler: effective defense counts enemy troops at and approaching a
//! position, plus static fortification bonuses only when enough troops man
//! them; the friendly side counts the combined strength of everything
//! arriving the same turn, not a single column in isolation.

use crate::core::config::OpsConfig;
use crate::core::types::{FactionId, LocationId, RoadId, Strength};
use crate::ops::movement::next_arrival;
use crate::world::World;

/// Enemy troops and static works defending a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatPicture {
    pub enemy_troops: Strength,
    pub static_bonus: Strength,
}

impl ThreatPicture {
    /// Troops plus the bonus, which only counts when the works are manned.
    pub fn effective_defense(&self, config: &OpsConfig) -> Strength {
        if self.enemy_troops >= config.defense_activation_troops {
            self.enemy_troops + self.static_bonus
        } else {
            self.enemy_troops
        }
    }
}

/// Threat picture at a location, counting enemies stationed there and
/// enemies marching toward it.
pub fn location_threat(
    world: &World,
    config: &OpsConfig,
    loc: LocationId,
    faction: FactionId,
) -> ThreatPicture {
    let stationed = world.enemy_strength_at(loc, faction);
    let approaching: Strength = world
        .armies
        .values()
        .filter(|a| a.faction != faction)
        .filter(|a| {
            matches!(
                a.position,
                crate::world::ArmyPosition::OnRoad { destination, .. } if destination == loc
            )
        })
        .map(|a| a.strength)
        .sum();
    let static_bonus = world
        .location(loc)
        .map(|l| l.defense_bonus(config.bonus_per_fort_level))
        .unwrap_or(0);
    ThreatPicture {
        enemy_troops: stationed + approaching,
        static_bonus,
    }
}

/// Threat picture at a single road stage.
pub fn stage_threat(
    world: &World,
    config: &OpsConfig,
    road_id: RoadId,
    stage_idx: usize,
    faction: FactionId,
) -> ThreatPicture {
    let enemy_troops: Strength = world
        .armies
        .values()
        .filter(|a| a.faction != faction)
        .filter(|a| {
            matches!(
                a.position,
                crate::world::ArmyPosition::OnRoad { road, stage, .. }
                    if road == road_id && stage == stage_idx
            )
        })
        .map(|a| a.strength)
        .sum();
    let static_bonus = world
        .road(road_id)
        .and_then(|r| r.stages.get(stage_idx))
        .map(|s| s.fortification * config.bonus_per_fort_level + s.natural_defense)
        .unwrap_or(0);
    ThreatPicture {
        enemy_troops,
        static_bonus,
    }
}

/// Combined strength of all `faction` armies reaching `loc` on the next
/// road advance, plus `extra` for the force under evaluation.
pub fn combined_arrival(
    world: &World,
    loc: LocationId,
    faction: FactionId,
    extra: Strength,
) -> Strength {
    let arriving: Strength = world
        .armies
        .values()
        .filter(|a| a.faction == faction)
        .filter(|a| next_arrival(world, a.id) == Some(loc))
        .map(|a| a.strength)
        .sum();
    arriving + extra
}

/// An attack is suicidal when the defense outweighs the combined friendly
/// strength by more than the configured ratio.
pub fn is_overmatched(config: &OpsConfig, effective_defense: Strength, combined: Strength) -> bool {
    effective_defense as f32 > config.suicide_ratio * combined as f32
}
