//! The shared world registry
//!
//! One mutable in-memory view of armies, locations, roads, characters and
//! factions. A faction's entire military pass is a single synchronous
//! mutation of this structure; the calling turn loop owns persistence.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{OpsError, Result};
use crate::core::types::{
    ArmyId, CharacterId, FactionId, IdAllocator, LocationId, RoadId, Strength,
};
use crate::world::army::{Army, ArmyPosition};
use crate::world::character::{Capability, Character};
use crate::world::faction::Faction;
use crate::world::location::Location;
use crate::world::road::Road;

/// UI notification raised when a siege touches a human-controlled target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiegeNotice {
    pub target: LocationId,
    pub target_name: String,
    pub attacker_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub armies: AHashMap<ArmyId, Army>,
    pub locations: AHashMap<LocationId, Location>,
    pub roads: AHashMap<RoadId, Road>,
    pub characters: AHashMap<CharacterId, Character>,
    pub factions: AHashMap<FactionId, Faction>,
    /// Shared event log the UI tails.
    pub log: Vec<String>,
    /// Pending UI notices.
    pub notices: Vec<SiegeNotice>,
    pub ids: IdAllocator,
}

impl World {
    pub fn new() -> Self {
        Self {
            armies: AHashMap::new(),
            locations: AHashMap::new(),
            roads: AHashMap::new(),
            characters: AHashMap::new(),
            factions: AHashMap::new(),
            log: Vec::new(),
            notices: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    // === Registry access ===

    pub fn army(&self, id: ArmyId) -> Option<&Army> {
        self.armies.get(&id)
    }

    pub fn army_mut(&mut self, id: ArmyId) -> Option<&mut Army> {
        self.armies.get_mut(&id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(&id)
    }

    pub fn add_location(&mut self, loc: Location) {
        self.locations.insert(loc.id, loc);
    }

    pub fn add_road(&mut self, road: Road) {
        self.roads.insert(road.id, road);
    }

    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.insert(faction.id, faction);
    }

    pub fn add_character(&mut self, character: Character) {
        self.characters.insert(character.id, character);
    }

    /// Spawn a new army with a fresh id.
    pub fn spawn_army(&mut self, faction: FactionId, strength: Strength, at: LocationId) -> ArmyId {
        let id = self.ids.next_army_id();
        self.armies.insert(id, Army::new(id, faction, strength, at));
        id
    }

    // === Map queries ===

    /// Roads touching `loc`.
    pub fn roads_at(&self, loc: LocationId) -> impl Iterator<Item = &Road> {
        self.roads.values().filter(move |r| r.connects(loc))
    }

    /// Neighboring locations: road ends plus the linked pair, if any.
    pub fn neighbors(&self, loc: LocationId) -> Vec<LocationId> {
        let mut out: Vec<LocationId> = self
            .roads_at(loc)
            .filter_map(|r| r.other_end(loc))
            .collect();
        if let Some(linked) = self.location(loc).and_then(|l| l.linked) {
            out.push(linked);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Faction-held location bordering hostile territory.
    pub fn is_frontier(&self, loc: LocationId, faction: FactionId) -> bool {
        if !self.location(loc).is_some_and(|l| l.is_held_by(faction)) {
            return false;
        }
        self.neighbors(loc)
            .iter()
            .any(|n| self.location(*n).is_some_and(|l| l.is_hostile_to(faction)))
    }

    // === Army queries ===

    pub fn armies_at(&self, loc: LocationId) -> impl Iterator<Item = &Army> {
        self.armies
            .values()
            .filter(move |a| a.location() == Some(loc))
    }

    /// Total strength of `faction` stationed at `loc`.
    pub fn strength_at(&self, loc: LocationId, faction: FactionId) -> Strength {
        self.armies_at(loc)
            .filter(|a| a.faction == faction)
            .map(|a| a.strength)
            .sum()
    }

    /// Total strength at `loc` hostile to `faction`.
    pub fn enemy_strength_at(&self, loc: LocationId, faction: FactionId) -> Strength {
        self.armies_at(loc)
            .filter(|a| a.faction != faction)
            .map(|a| a.strength)
            .sum()
    }

    /// Strength of `faction` armies currently on a road marching to `loc`.
    pub fn strength_en_route(&self, loc: LocationId, faction: FactionId) -> Strength {
        self.armies
            .values()
            .filter(|a| a.faction == faction)
            .filter(|a| matches!(a.position, ArmyPosition::OnRoad { destination, .. } if destination == loc))
            .map(|a| a.strength)
            .sum()
    }

    /// Enemy armies besieging `loc` (sieging flag set, stationed there).
    pub fn besieger_strength_at(&self, loc: LocationId, faction: FactionId) -> Strength {
        self.armies_at(loc)
            .filter(|a| a.faction != faction && a.sieging)
            .map(|a| a.strength)
            .sum()
    }

    /// Same-faction character with `cap` present at `loc`.
    pub fn capability_present(&self, loc: LocationId, faction: FactionId, cap: Capability) -> bool {
        self.characters
            .values()
            .any(|c| c.faction == faction && c.location == Some(loc) && c.has(cap))
    }

    // === Army mutation ===

    /// Split `amount` off `id` into a new derived-id army.
    ///
    /// Strength-conserving; the new army copies faction, position, and all
    /// flags. `amount` must be positive and strictly less than the army's
    /// strength.
    pub fn split_army(&mut self, id: ArmyId, amount: Strength) -> Result<ArmyId> {
        let army = self.armies.get(&id).ok_or(OpsError::ArmyNotFound(id))?;
        if amount == 0 || amount >= army.strength {
            return Err(OpsError::InvalidSplit(format!(
                "cannot split {} of {} from {:?}",
                amount, army.strength, id
            )));
        }
        let mut detached = army.clone();
        let new_id = self.ids.next_army_id();
        detached.id = new_id;
        detached.strength = amount;
        if let Some(army) = self.armies.get_mut(&id) {
            army.strength -= amount;
        }
        self.armies.insert(new_id, detached);
        Ok(new_id)
    }

    /// Merge `ids` into a single new army with their summed strength.
    ///
    /// Characters commanding any of the absorbed armies are repointed to
    /// the merged one. Ids that no longer resolve are skipped.
    pub fn merge_armies(&mut self, ids: &[ArmyId]) -> Option<ArmyId> {
        let mut absorbed: Vec<Army> = Vec::new();
        for id in ids {
            if let Some(army) = self.armies.remove(id) {
                absorbed.push(army);
            }
        }
        let first = absorbed.first()?;
        let mut merged = first.clone();
        merged.id = self.ids.next_army_id();
        merged.strength = absorbed.iter().map(|a| a.strength).sum();
        let merged_id = merged.id;
        for character in self.characters.values_mut() {
            if character
                .commanding
                .is_some_and(|cmd| absorbed.iter().any(|a| a.id == cmd))
            {
                character.commanding = Some(merged_id);
            }
        }
        self.armies.insert(merged_id, merged);
        Some(merged_id)
    }

    /// Drop zero-strength armies and detach their commanders.
    pub fn remove_dead(&mut self) {
        let dead: Vec<ArmyId> = self
            .armies
            .values()
            .filter(|a| a.strength == 0)
            .map(|a| a.id)
            .collect();
        for id in dead {
            self.armies.remove(&id);
            for character in self.characters.values_mut() {
                if character.commanding == Some(id) {
                    character.commanding = None;
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
