//! Faction records
//!
//! Gold is the only resource this engine touches directly: siege execution
//! decrements it in place. Everything else about a faction's economy lives
//! upstream.

use serde::{Deserialize, Serialize};

use crate::core::types::FactionId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub gold: u32,
    /// Eligible to negotiate with neutral settlements instead of besieging.
    pub diplomatic: bool,
    /// Human-controlled; sieges against it raise a UI notice.
    pub human: bool,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gold: 0,
            diplomatic: false,
            human: false,
        }
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_diplomatic(mut self) -> Self {
        self.diplomatic = true;
        self
    }

    pub fn with_human(mut self) -> Self {
        self.human = true;
        self
    }
}
