//! Terrain and object classification tables.
//!
//! Tile and object-kind ids are content-specific; the engine never matches on
//! raw ids. A [`Classification`] table is supplied with the zone
//! configuration and resolved once — at object creation or at tile lookup —
//! into the small enums the collision engine actually branches on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::sink;

/// How a terrain tile interacts with a hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainClass {
    /// Passable water; satisfies the hull's water requirement at its z.
    Water,
    /// Solid ground, rock, or anything else a hull cannot sit on.
    Blocking,
    /// Neither floats nor blocks (void tiles, cave mouths).
    Ignorable,
}

/// Behavioral category of a dynamic or static object, resolved once from its
/// kind id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectCategory {
    /// Spent ammunition; never blocks, restacked after a hull passes.
    Projectile,
    /// Ground decals (blood and the like); never block.
    Decal,
    /// Corpse-like soft obstruction; sinks under repeated contact, sits deep.
    Corpse,
    /// Light soft obstruction (driftwood, refuse); sinks, shallow draft.
    Flotsam,
    /// Water-surface furniture (buoys, lilypads); satisfies the water
    /// requirement and never blocks.
    WaterSurface,
    /// Ordinary blocking object.
    Solid,
}

impl ObjectCategory {
    /// Categories that never obstruct a hull regardless of position.
    pub fn never_blocks(self) -> bool {
        matches!(
            self,
            ObjectCategory::Projectile | ObjectCategory::Decal | ObjectCategory::WaterSurface
        )
    }

    /// Categories that yield to repeated contact instead of hard-blocking.
    pub fn is_sinkable(self) -> bool {
        matches!(self, ObjectCategory::Corpse | ObjectCategory::Flotsam)
    }

    /// Vertical clearance below the hull this category needs before it stops
    /// obstructing. Corpses sit deeper than flotsam.
    pub fn sink_clearance(self) -> i8 {
        match self {
            ObjectCategory::Corpse => sink::CORPSE_CLEARANCE,
            ObjectCategory::Flotsam => sink::FLOTSAM_CLEARANCE,
            _ => 0,
        }
    }
}

/// Externally supplied classification of content ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Terrain tile id → class. Unlisted ids block.
    pub terrain: HashMap<u16, TerrainClass>,
    /// Object kind id → category. Unlisted kinds are solid.
    pub objects: HashMap<u16, ObjectCategory>,
    /// Projectile kinds restacked (identical stacks merged) after the hull
    /// moves across them.
    pub restacked: Vec<u16>,
}

impl Classification {
    pub fn terrain_class(&self, id: u16) -> TerrainClass {
        self.terrain.get(&id).copied().unwrap_or(TerrainClass::Blocking)
    }

    pub fn category(&self, kind: u16) -> ObjectCategory {
        self.objects.get(&kind).copied().unwrap_or(ObjectCategory::Solid)
    }

    pub fn is_restacked(&self, kind: u16) -> bool {
        self.restacked.contains(&kind)
    }

    /// A ready-made table for the default sea content set ([`ids`]). Hosts
    /// with their own tile sets supply their own table.
    pub fn default_sea() -> Self {
        use ids::*;
        let mut terrain = HashMap::new();
        terrain.insert(TERRAIN_DEEP_WATER, TerrainClass::Water);
        terrain.insert(TERRAIN_OPEN_WATER, TerrainClass::Water);
        terrain.insert(TERRAIN_SHALLOWS, TerrainClass::Water);
        terrain.insert(TERRAIN_SAND, TerrainClass::Blocking);
        terrain.insert(TERRAIN_ROCK, TerrainClass::Blocking);
        terrain.insert(TERRAIN_VOID, TerrainClass::Ignorable);

        let mut objects = HashMap::new();
        objects.insert(KIND_ARROW, ObjectCategory::Projectile);
        objects.insert(KIND_BOLT, ObjectCategory::Projectile);
        objects.insert(KIND_BLOODSTAIN, ObjectCategory::Decal);
        objects.insert(KIND_CORPSE, ObjectCategory::Corpse);
        objects.insert(KIND_DRIFTWOOD, ObjectCategory::Flotsam);
        objects.insert(KIND_BUOY, ObjectCategory::WaterSurface);
        objects.insert(KIND_WATER_STATIC, ObjectCategory::WaterSurface);
        objects.insert(KIND_CRATE, ObjectCategory::Solid);
        objects.insert(KIND_REEF_SPUR, ObjectCategory::Solid);

        Self {
            terrain,
            objects,
            restacked: vec![KIND_ARROW, KIND_BOLT],
        }
    }
}

/// Content ids for the default sea set, used by tests and the simtest
/// harness. Real deployments map their own tile tables.
pub mod ids {
    pub const TERRAIN_DEEP_WATER: u16 = 1;
    pub const TERRAIN_OPEN_WATER: u16 = 2;
    pub const TERRAIN_SHALLOWS: u16 = 3;
    pub const TERRAIN_SAND: u16 = 10;
    pub const TERRAIN_ROCK: u16 = 11;
    pub const TERRAIN_VOID: u16 = 12;

    pub const KIND_ARROW: u16 = 100;
    pub const KIND_BOLT: u16 = 101;
    pub const KIND_BLOODSTAIN: u16 = 102;
    pub const KIND_CORPSE: u16 = 110;
    pub const KIND_DRIFTWOOD: u16 = 111;
    pub const KIND_BUOY: u16 = 120;
    /// Static water overlay tile (satisfies the water requirement at its z).
    pub const KIND_WATER_STATIC: u16 = 121;
    pub const KIND_CRATE: u16 = 130;
    pub const KIND_REEF_SPUR: u16 = 131;
}
