//! ECS components for dynamic objects and actors on the water.
//!
//! Vessels themselves are aggregates in the registry, not entities; only the
//! loose world around them — crew, corpses, flotsam, spent arrows, charts —
//! lives in the hecs world.

use serde::{Deserialize, Serialize};

use tidecraft_logic::grid::CellPos;

/// Shared lock credential minted at placement and cut onto keys.
pub type KeyValue = u32;

/// Vertical height of an actor, in z units.
pub const MOBILE_HEIGHT: i8 = 2;

/// World position component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub cell: CellPos,
}

impl Position {
    pub fn at(cell: CellPos) -> Self {
        Self { cell }
    }
}

/// A dynamic object's physical presence. The behavioral category is resolved
/// from `kind` through the zone's classification table, once, at scan time
/// entry — never by probing concrete types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Content kind id, classified by the zone's table.
    pub kind: u16,
    /// Vertical extent; the object spans `[z, z + height)`.
    pub height: i8,
    pub movable: bool,
    pub visible: bool,
    /// Stack size for stackable kinds (arrows, bolts).
    pub amount: u16,
    /// How many times this object has been pushed under; bounded by the
    /// sink step limit.
    pub sunk_steps: u8,
}

impl Body {
    pub fn new(kind: u16) -> Self {
        Self {
            kind,
            height: 1,
            movable: true,
            visible: true,
            amount: 1,
            sunk_steps: 0,
        }
    }

    pub fn with_height(mut self, height: i8) -> Self {
        self.height = height;
        self
    }

    pub fn immovable(mut self) -> Self {
        self.movable = false;
        self
    }

    pub fn with_amount(mut self, amount: u16) -> Self {
        self.amount = amount;
        self
    }
}

/// An actor (player or NPC). Actors block hulls like solid objects but are
/// never deck jams, and they ride translations and rotations when aboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mobile {
    pub name: String,
    pub is_staff: bool,
}

impl Mobile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_staff: false,
        }
    }

    pub fn staff(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_staff: true,
        }
    }
}

/// Something an actor or corpse carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carried {
    Key(KeyValue),
    KeyRing(Vec<KeyValue>),
    Trinket(u16),
}

/// Carried items, on an actor's person or inside a corpse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Carried>,
}

impl Inventory {
    pub fn with(items: Vec<Carried>) -> Self {
        Self { items }
    }

    /// Whether a matching key is carried, loose or on a keyring.
    pub fn holds_key(&self, key: KeyValue) -> bool {
        self.items.iter().any(|item| match item {
            Carried::Key(k) => *k == key,
            Carried::KeyRing(ring) => ring.contains(&key),
            Carried::Trinket(_) => false,
        })
    }
}

/// Marks a corpse as the remains of a specific actor, for the salvage rule
/// variant that honors a dead holder's key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Remains {
    /// Entity bits of the actor these remains belonged to.
    pub of: u64,
}

/// A navigation artifact: ordered waypoint pins anchored to world cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub pins: Vec<CellPos>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyring_counts_as_holding() {
        let inv = Inventory::with(vec![Carried::KeyRing(vec![7, 9]), Carried::Trinket(3)]);
        assert!(inv.holds_key(9));
        assert!(!inv.holds_key(8));
    }

    #[test]
    fn loose_key_counts() {
        let inv = Inventory::with(vec![Carried::Key(42)]);
        assert!(inv.holds_key(42));
        assert!(!Inventory::default().holds_key(42));
    }
}
