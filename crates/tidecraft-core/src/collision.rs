//! The fit engine — can a hull occupy a candidate cell and facing?
//!
//! Check order is cheap-first: per-cell terrain and static-stack tests run
//! before the dynamic-object scan, and the scan itself defers soft
//! obstructions (corpses, flotsam) to a final clearance pass so a blocked
//! step can tell a hard obstacle from one that will yield. The engine never
//! mutates anything.

use tidecraft_logic::classify::{ObjectCategory, TerrainClass};
use tidecraft_logic::constants::DRAFT;
use tidecraft_logic::footprint::{HullClass, HullPlan};
use tidecraft_logic::grid::{CellPos, Facing};

use crate::vessel::{Vessel, VesselId};
use crate::world::Zone;

/// A candidate placement under test.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub plan: HullPlan,
    pub target: CellPos,
    pub facing: Facing,
    /// Current position and facing, when the hull already exists. Cells the
    /// hull presently occupies are always legal (self-overlap), and objects
    /// inside them are aboard.
    pub current: Option<(CellPos, Facing)>,
    /// Vessel to leave out of the hull-vs-hull test.
    pub exclude: Option<VesselId>,
}

impl Probe {
    /// A translation step of an existing vessel.
    pub fn step(vessel: &Vessel, target: CellPos) -> Self {
        Self {
            plan: vessel.plan(),
            target,
            facing: vessel.facing,
            current: Some((vessel.origin, vessel.facing)),
            exclude: Some(vessel.id),
        }
    }

    /// A facing change of an existing vessel in place.
    pub fn turn(vessel: &Vessel, facing: Facing) -> Self {
        Self {
            plan: vessel.plan(),
            target: vessel.origin,
            facing,
            current: Some((vessel.origin, vessel.facing)),
            exclude: Some(vessel.id),
        }
    }

    /// A fresh placement from a deed token.
    pub fn place(class: HullClass, target: CellPos, facing: Facing) -> Self {
        Self {
            plan: class.plan(),
            target,
            facing,
            current: None,
            exclude: None,
        }
    }
}

/// What stopped the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCause {
    /// Candidate cell is outside the loaded map.
    OffWorld { x: i32, y: i32 },
    /// Candidate cell escapes the active-zone rectangle.
    OutsideWrap { x: i32, y: i32 },
    /// No water under this cell at the hull's draft.
    NoWater { x: i32, y: i32 },
    /// A static tile overlaps the draft window.
    StaticTile { x: i32, y: i32 },
    /// A blocking object overlaps the draft window.
    Object { x: i32, y: i32 },
    /// Another hull occupies part of the candidate footprint.
    OtherVessel(VesselId),
}

/// Fit verdict. `SoftBlocked` means the *only* obstructions are sinkable and
/// not yet deep enough; the movement controller may push them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fit {
    Clear,
    Blocked(BlockCause),
    SoftBlocked { sinkables: Vec<hecs::Entity> },
}

impl Fit {
    pub fn is_clear(&self) -> bool {
        matches!(self, Fit::Clear)
    }
}

/// Vertical span overlap against the hull draft window `[z, z + DRAFT)`.
fn overlaps_draft(obj_z: i8, obj_height: i8, hull_z: i8) -> bool {
    let (oz, oh) = (obj_z as i32, obj_height.max(0) as i32);
    let hz = hull_z as i32;
    oz < hz + DRAFT as i32 && hz < oz + oh
}

/// Test whether a hull fits at `probe.target` with `probe.facing`.
pub fn can_fit(zone: &Zone, probe: &Probe) -> Fit {
    let plan = probe.plan;
    let hull_z = probe.target.z;
    let rect = plan.bounding_rect(probe.target, probe.facing);

    // One sweep for everything loose in the candidate area; the footprint
    // cells are a subset of the bounding rectangle.
    let bodies = zone.bodies_in(&rect);

    let aboard = |x: i32, y: i32| -> bool {
        match probe.current {
            Some((cur, cur_facing)) => plan.covers(cur_facing, x - cur.x, y - cur.y),
            None => false,
        }
    };

    // Per-cell terrain, statics, and immovable objects.
    for (dx, dy) in plan.offsets(probe.facing) {
        let x = probe.target.x + dx;
        let y = probe.target.y + dy;

        // Cells the hull already occupies are always legal.
        if aboard(x, y) {
            continue;
        }

        // Hard containment: a hull inside the active zone may not fit to a
        // cell outside it.
        if zone.rules.contain_to_wrap {
            if let (Some(wrap), Some((cur, _))) = (&zone.wrap, probe.current) {
                if wrap.contains_cell(cur) && !wrap.contains(x, y) {
                    return Fit::Blocked(BlockCause::OutsideWrap { x, y });
                }
            }
        }

        if !zone.map.bounds().contains(x, y) {
            return Fit::Blocked(BlockCause::OffWorld { x, y });
        }

        let mut has_water = false;

        if let Some(tile) = zone.map.terrain_at(x, y) {
            if zone.classify.terrain_class(tile.id) == TerrainClass::Water && tile.z == hull_z {
                has_water = true;
            }
        }

        for tile in zone.map.statics_at(x, y) {
            if zone.classify.category(tile.id) == ObjectCategory::WaterSurface {
                if tile.z == hull_z {
                    has_water = true;
                }
            } else if overlaps_draft(tile.z, tile.height, hull_z) {
                return Fit::Blocked(BlockCause::StaticTile { x, y });
            }
        }

        for body in bodies.iter().filter(|b| !b.movable) {
            if body.cell.x != x || body.cell.y != y {
                continue;
            }
            let category = body
                .kind
                .map(|k| zone.classify.category(k))
                .unwrap_or(ObjectCategory::Solid);
            if category == ObjectCategory::WaterSurface {
                if body.cell.z == hull_z {
                    has_water = true;
                }
            } else if overlaps_draft(body.cell.z, body.height, hull_z) {
                return Fit::Blocked(BlockCause::Object { x, y });
            }
        }

        if !has_water {
            return Fit::Blocked(BlockCause::NoWater { x, y });
        }
    }

    // Dynamic scan: movable objects and actors across the candidate area.
    let mut sinkables: Vec<(hecs::Entity, CellPos, ObjectCategory)> = Vec::new();
    for body in bodies.iter().filter(|b| b.movable) {
        if !body.visible {
            continue;
        }
        let category = body
            .kind
            .map(|k| zone.classify.category(k))
            .unwrap_or(ObjectCategory::Solid);
        if category.never_blocks() {
            continue;
        }
        // Aboard objects ride along; they never obstruct their own hull.
        if aboard(body.cell.x, body.cell.y) {
            continue;
        }
        // Only the candidate footprint itself can be obstructed.
        if !plan.covers(
            probe.facing,
            body.cell.x - probe.target.x,
            body.cell.y - probe.target.y,
        ) {
            continue;
        }
        if category.is_sinkable() {
            sinkables.push((body.entity, body.cell, category));
            continue;
        }
        if overlaps_draft(body.cell.z, body.height, hull_z) {
            return Fit::Blocked(BlockCause::Object {
                x: body.cell.x,
                y: body.cell.y,
            });
        }
    }

    // Hull-vs-hull: any other vessel covering a candidate cell blocks.
    for (other_id, other) in zone.vessels.iter() {
        if probe.exclude == Some(other_id) {
            continue;
        }
        if !other.bounding_rect().intersects(&rect) {
            continue;
        }
        for (dx, dy) in plan.offsets(probe.facing) {
            let cell = probe.target.shifted(dx, dy);
            if other.contains(cell) {
                return Fit::Blocked(BlockCause::OtherVessel(other_id));
            }
        }
    }

    // Soft obstructions: pass only if every one already sits deep enough.
    if sinkables.is_empty() {
        return Fit::Clear;
    }
    let all_cleared = sinkables
        .iter()
        .all(|(_, cell, category)| (cell.z as i32) + category.sink_clearance() as i32 <= hull_z as i32);
    if all_cleared {
        Fit::Clear
    } else {
        Fit::SoftBlocked {
            sinkables: sinkables.into_iter().map(|(e, _, _)| e).collect(),
        }
    }
}
