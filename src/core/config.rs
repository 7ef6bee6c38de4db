//! Engine configuration with documented constants
//!
//! All tuning numbers for the military operations engine are collected here
//! with explanations of their purpose and how they interact.

use serde::{Deserialize, Serialize};

/// Configuration for the military operations engine
///
/// Defaults reproduce the balance the turn loop was tuned against. Changing
/// them shifts how aggressively factions mass, march, and besiege.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    // === GARRISONS ===
    /// Lower clamp for the computed garrison floor of any held location.
    pub garrison_floor_min: u32,
    /// Upper clamp for the computed garrison floor.
    pub garrison_floor_max: u32,
    /// Minimum floor for strategic points and frontier locations.
    ///
    /// Frontier locations (adjacent to hostile territory) must never be
    /// stripped below this by reinforcement pulls.
    pub frontier_floor: u32,

    // === PATHFINDING ===
    /// Extra edge weight for entering a hostile-held location.
    pub hostile_node_penalty: u32,
    /// Extra edge weight for entering a location occupied by enemy armies.
    pub occupied_node_penalty: u32,

    // === REINFORCEMENT ===
    /// Minimum surplus at a source before a partial (split) transfer is
    /// worth fragmenting an army over.
    pub min_split_surplus: u32,
    /// Reinforcement requests smaller than this are ignored. Prevents a
    /// campaign from churning tiny pulls every turn.
    pub min_reinforce_deficit: u32,

    // === CAMPAIGNS ===
    /// Lower clamp on the force required to launch an attack.
    pub min_attack_force: u32,
    /// Upper clamp on the force required to launch an attack.
    pub max_attack_force: u32,
    /// Attack launches once the gathered force exceeds this, regardless of
    /// the computed requirement (mass override).
    pub mass_override_force: u32,
    /// Multiplier over the enemy garrison used to size the attack force.
    pub attack_force_ratio: f32,
    /// An active offense whose committed strength falls below
    /// `required * zombie_ratio` (min 500) regresses to gathering.
    pub zombie_ratio: f32,
    /// Friendly strength must exceed effective enemy defense by this factor
    /// before an advance is considered survivable.
    pub suicide_ratio: f32,
    /// Enemy troops below this count contribute no fortification bonus to
    /// effective defense (an empty fort does not fight back).
    pub defense_activation_troops: u32,
    /// Share of its strength target each convergent staging point must
    /// reach before a synchronized launch.
    pub readiness_threshold: f32,
    /// Smallest army a convergent launch will commit.
    pub min_launch_army: u32,

    // === SIEGES ===
    /// Gold cost of one siege action, indexed by fortification level and
    /// clamped at the top entry.
    pub siege_cost_by_level: Vec<u32>,
    /// Manpower required to conduct a siege.
    pub siege_manpower: u32,
    /// Manpower required against fortification level 3 and above.
    pub siege_manpower_heavy: u32,
    /// Defense bonus granted per fortification level.
    pub bonus_per_fort_level: u32,
    /// A city with at least this much stored food counts as food-surplus
    /// for the negotiate-instead-of-siege branch.
    pub food_surplus_min: i32,
    /// Hop radius searched for a food-surplus city near a neutral target.
    pub negotiate_search_radius: u32,

    // === DEFENSE ===
    /// Defenders sortie against besiegers at this strength advantage.
    pub sortie_ratio: f32,
    /// Largest regiment peeled off an over-strength garrison to screen a
    /// nearby road stage.
    pub max_screen_regiment: u32,
    /// Strength of a road-stage screening regiment.
    pub screen_regiment: u32,

    // === IDLE ARMIES ===
    /// Idle armies redeploy toward campaigns within this hop distance.
    pub campaign_pull_range: u32,
    /// Idle armies redeploy toward strategic points within this hop
    /// distance.
    pub deploy_point_range: u32,

    // === CONSOLIDATION ===
    /// Number of co-located eligible armies that triggers a merge.
    pub consolidation_threshold: usize,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            garrison_floor_min: 500,
            garrison_floor_max: 4000,
            frontier_floor: 1000,
            hostile_node_penalty: 10,
            occupied_node_penalty: 50,
            min_split_surplus: 500,
            min_reinforce_deficit: 200,
            min_attack_force: 1000,
            max_attack_force: 3000,
            mass_override_force: 2000,
            attack_force_ratio: 1.25,
            zombie_ratio: 0.3,
            suicide_ratio: 1.5,
            defense_activation_troops: 500,
            readiness_threshold: 0.7,
            min_launch_army: 200,
            siege_cost_by_level: vec![0, 50, 75, 100, 150],
            siege_manpower: 500,
            siege_manpower_heavy: 1000,
            bonus_per_fort_level: 400,
            food_surplus_min: 100,
            negotiate_search_radius: 3,
            sortie_ratio: 1.5,
            max_screen_regiment: 1000,
            screen_regiment: 500,
            campaign_pull_range: 10,
            deploy_point_range: 4,
            consolidation_threshold: 5,
        }
    }
}

impl OpsConfig {
    /// Gold cost of a siege action against the given fortification level.
    pub fn siege_cost(&self, fortification: u32) -> u32 {
        let idx = (fortification as usize).min(self.siege_cost_by_level.len().saturating_sub(1));
        self.siege_cost_by_level.get(idx).copied().unwrap_or(0)
    }

    /// Manpower a siege requires at the given fortification level.
    pub fn siege_manpower_for(&self, fortification: u32) -> u32 {
        if fortification >= 3 {
            self.siege_manpower_heavy
        } else {
            self.siege_manpower
        }
    }
}
