//! The zone — terrain queries, the dynamic-object world, and the vessel
//! registry, owned together and passed by reference to every subsystem.
//!
//! Terrain and static tiles sit behind the [`SeaMap`] trait; the host game
//! supplies the real map, and [`GridMap`] is the in-memory implementation
//! used by tests and the simtest harness. There are no process-wide statics:
//! anything that needs to enumerate vessels takes the zone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tidecraft_logic::classify::Classification;
use tidecraft_logic::grid::{CellPos, Rect};

use crate::components::{Body, Mobile, Position, MOBILE_HEIGHT};
use crate::events::Outbox;
use crate::scheduler::{Scheduler, Tick};
use crate::vessel::VesselRegistry;

/// One terrain tile: content id plus surface elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTile {
    pub id: u16,
    pub z: i8,
}

/// One static tile in a cell's stack, spanning `[z, z + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTile {
    pub id: u16,
    pub z: i8,
    pub height: i8,
}

/// Read-only map queries supplied by the host. The collision engine performs
/// no mutation through this interface.
pub trait SeaMap {
    /// World plane this map belongs to.
    fn plane(&self) -> u8;
    /// Loaded cell bounds. Queries outside are invalid.
    fn bounds(&self) -> Rect;
    fn terrain_at(&self, x: i32, y: i32) -> Option<TerrainTile>;
    fn statics_at(&self, x: i32, y: i32) -> &[StaticTile];
}

/// In-memory map: a fill terrain with sparse overrides and static stacks.
pub struct GridMap {
    plane: u8,
    bounds: Rect,
    fill: TerrainTile,
    terrain: HashMap<(i32, i32), TerrainTile>,
    statics: HashMap<(i32, i32), Vec<StaticTile>>,
}

impl GridMap {
    /// A map filled edge to edge with one terrain, e.g. open water.
    pub fn filled(plane: u8, bounds: Rect, fill: TerrainTile) -> Self {
        Self {
            plane,
            bounds,
            fill,
            terrain: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    pub fn set_terrain(&mut self, x: i32, y: i32, tile: TerrainTile) {
        self.terrain.insert((x, y), tile);
    }

    pub fn add_static(&mut self, x: i32, y: i32, tile: StaticTile) {
        self.statics.entry((x, y)).or_default().push(tile);
    }
}

impl SeaMap for GridMap {
    fn plane(&self) -> u8 {
        self.plane
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn terrain_at(&self, x: i32, y: i32) -> Option<TerrainTile> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some(*self.terrain.get(&(x, y)).unwrap_or(&self.fill))
    }

    fn statics_at(&self, x: i32, y: i32) -> &[StaticTile] {
        self.statics.get(&(x, y)).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Rule-set switches that vary between deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// Salvage variant: a shared key inside a dead holder's remains still
    /// authorizes that holder's living owner at the helm.
    pub honor_dead_holders: bool,
    /// Hulls inside the wrap rectangle may not fit to cells outside it.
    pub contain_to_wrap: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            honor_dead_holders: false,
            contain_to_wrap: true,
        }
    }
}

/// A loose object or actor as the collision engine sees it.
#[derive(Debug, Clone, Copy)]
pub struct BodyView {
    pub entity: hecs::Entity,
    pub cell: CellPos,
    /// Content kind; `None` for actors, which classify as solid.
    pub kind: Option<u16>,
    pub height: i8,
    pub movable: bool,
    pub visible: bool,
}

/// A loaded world plane: map, dynamic objects, vessels, and zone policy.
pub struct Zone {
    pub map: Box<dyn SeaMap>,
    pub objects: hecs::World,
    pub vessels: VesselRegistry,
    pub classify: Classification,
    pub rules: RuleSet,
    /// Active-zone rectangle; hulls crossing its edge wrap to the opposite
    /// edge instead of sailing off-grid.
    pub wrap: Option<Rect>,
    /// World rectangles the crew refuses to enter.
    pub forbidden: Vec<Rect>,
}

impl Zone {
    pub fn new(map: Box<dyn SeaMap>, classify: Classification) -> Self {
        Self {
            map,
            objects: hecs::World::new(),
            vessels: VesselRegistry::new(),
            classify,
            rules: RuleSet::default(),
            wrap: None,
            forbidden: Vec::new(),
        }
    }

    /// Swap in a classification table from its JSON form, as deployments
    /// ship them alongside map data.
    pub fn set_classification_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        self.classify = serde_json::from_str(json)?;
        Ok(())
    }

    /// Every object and actor whose cell lies inside `rect`.
    pub fn bodies_in(&self, rect: &Rect) -> Vec<BodyView> {
        let mut found = Vec::new();
        for (entity, (pos, body, mobile)) in self
            .objects
            .query::<(&Position, Option<&Body>, Option<&Mobile>)>()
            .iter()
        {
            if !rect.contains_cell(pos.cell) {
                continue;
            }
            match (body, mobile) {
                (Some(b), _) => found.push(BodyView {
                    entity,
                    cell: pos.cell,
                    kind: Some(b.kind),
                    height: b.height,
                    movable: b.movable,
                    visible: b.visible,
                }),
                (None, Some(_)) => found.push(BodyView {
                    entity,
                    cell: pos.cell,
                    kind: None,
                    height: MOBILE_HEIGHT,
                    movable: true,
                    visible: true,
                }),
                (None, None) => {}
            }
        }
        found
    }

    /// Whether any positioned entity stands on `cell` (planar match).
    pub fn cell_occupied(&self, cell: CellPos) -> bool {
        self.objects
            .query::<&Position>()
            .iter()
            .any(|(_, pos)| pos.cell.x == cell.x && pos.cell.y == cell.y)
    }
}

/// Mutation context threaded through command handlers and scheduled tasks.
pub struct Ctx<'a> {
    pub zone: &'a mut Zone,
    pub scheduler: &'a mut Scheduler,
    pub outbox: &'a mut Outbox,
    pub now: Tick,
}
