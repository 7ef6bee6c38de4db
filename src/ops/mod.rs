//! Military operations: pathfinding, movement, and mission handling

pub mod campaign;
pub mod context;
pub mod defense;
pub mod distance;
pub mod garrison;
pub mod idle;
pub mod movement;
pub mod orchestrator;
pub mod pathfind;
pub mod reinforce;
pub mod siege;
pub mod threat;

pub use context::TurnContext;
pub use orchestrator::run_faction_turn;
