//! Strategic-map world model: armies, locations, roads, characters, factions

pub mod army;
pub mod character;
pub mod faction;
pub mod location;
pub mod road;
pub mod world;

pub use army::{Army, ArmyPosition, RoadDirection};
pub use character::{Capability, Character};
pub use faction::Faction;
pub use location::{Location, LocationKind};
pub use road::{Road, RoadQuality, RoadStage};
pub use world::{SiegeNotice, World};
