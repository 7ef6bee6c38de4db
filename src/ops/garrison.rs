//! Minimum garrison calculation
//!
//! How many soldiers a location must keep back before anything may be
//! pulled away. Recomputed fresh at every decision point: population and
//! stability drift between turns, so a cached floor goes stale.

use crate::core::config::OpsConfig;
use crate::core::types::{FactionId, LocationId, Strength};
use crate::world::{Capability, World};

/// Minimum defensible strength for a location, in `[0, 4000]`.
///
/// Large, restless populations demand more. Strategic points and frontier
/// locations never drop below the frontier floor. A garrison-substitute
/// hero on site replaces the garrison entirely.
pub fn min_garrison(
    world: &World,
    config: &OpsConfig,
    loc: LocationId,
    faction: FactionId,
) -> Strength {
    let Some(location) = world.location(loc) else {
        return 0;
    };

    if world.capability_present(loc, faction, Capability::GarrisonSubstitute) {
        return 0;
    }

    let population = location.population as f32;
    let unrest = (120 - location.stability.min(120)) as f32;
    let base = 10.0 * (population / 100_000.0) * unrest + 100.0;
    let mut floor = (base as Strength).clamp(config.garrison_floor_min, config.garrison_floor_max);

    if location.strategic || world.is_frontier(loc, faction) {
        floor = floor.max(config.frontier_floor);
    }

    floor.min(config.garrison_floor_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CharacterId, RoadId};
    use crate::world::{Character, Faction, Location, LocationKind, Road};

    fn world_with(loc: Location) -> World {
        let mut world = World::new();
        world.add_faction(Faction::new(FactionId(1), "Ardan"));
        world.add_location(loc);
        world
    }

    #[test]
    fn test_small_quiet_town_hits_lower_clamp() {
        let world = world_with(
            Location::new(LocationId(1), "Hamlet", LocationKind::Rural)
                .with_faction(FactionId(1))
                .with_population(10_000, 100),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 500);
    }

    #[test]
    fn test_large_restless_city_hits_upper_clamp() {
        let world = world_with(
            Location::new(LocationId(1), "Great City", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(800_000, 20),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 4000);
    }

    #[test]
    fn test_midsize_city_between_clamps() {
        // 10 * (200_000/100_000) * (120-70) + 100 = 1100
        let world = world_with(
            Location::new(LocationId(1), "Midton", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(200_000, 70),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 1100);
    }

    #[test]
    fn test_strategic_point_raised_to_frontier_floor() {
        let world = world_with(
            Location::new(LocationId(1), "Pass", LocationKind::Rural)
                .with_faction(FactionId(1))
                .with_population(5_000, 100)
                .with_strategic(),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 1000);
    }

    #[test]
    fn test_frontier_location_raised() {
        let mut world = world_with(
            Location::new(LocationId(1), "Border Town", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(5_000, 100),
        );
        world.add_location(
            Location::new(LocationId(2), "Enemy Keep", LocationKind::City)
                .with_faction(FactionId(9)),
        );
        world.add_road(Road::local(RoadId(1), LocationId(1), LocationId(2)));
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 1000);
    }

    #[test]
    fn test_hero_substitutes_for_garrison() {
        let mut world = world_with(
            Location::new(LocationId(1), "Heroheim", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(800_000, 20)
                .with_strategic(),
        );
        world.add_character(
            Character::new(CharacterId(1), "Aldric", FactionId(1))
                .at(LocationId(1))
                .with_capability(Capability::GarrisonSubstitute),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 0);
    }

    #[test]
    fn test_enemy_hero_does_not_substitute() {
        let mut world = world_with(
            Location::new(LocationId(1), "Town", LocationKind::City)
                .with_faction(FactionId(1))
                .with_population(10_000, 100),
        );
        world.add_character(
            Character::new(CharacterId(1), "Foe", FactionId(2))
                .at(LocationId(1))
                .with_capability(Capability::GarrisonSubstitute),
        );
        let floor = min_garrison(&world, &OpsConfig::default(), LocationId(1), FactionId(1));
        assert_eq!(floor, 500);
    }
}
