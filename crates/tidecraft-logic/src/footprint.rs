//! Hull plans — the cells a vessel occupies and where its fixtures sit.
//!
//! A plan is defined once in the canonical north frame and rotated exactly
//! for the other three facings. Fixture positions are value offsets from the
//! origin, recomputed on every transform; they are never stored as absolute
//! ground truth.

use serde::{Deserialize, Serialize};

use crate::constants::hold_tiers;
use crate::grid::{rotate_offset, CellPos, Facing, Rect};

/// Hull size class. Determines footprint dimensions and hold capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HullClass {
    Small,
    Medium,
    Large,
}

impl HullClass {
    pub fn hold_capacity(self) -> u16 {
        match self {
            HullClass::Small => hold_tiers::SMALL,
            HullClass::Medium => hold_tiers::MEDIUM,
            HullClass::Large => hold_tiers::LARGE,
        }
    }

    pub fn plan(self) -> HullPlan {
        HullPlan::of(self)
    }
}

/// A rigid fixture riding the hull at a fixed relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fixture {
    /// Command console at the stern; reference point for helm access.
    Helm,
    /// Cargo container at the bow.
    Hold,
    /// Port-side boarding door.
    PortPlank,
    /// Starboard-side boarding door.
    StarboardPlank,
}

/// Footprint geometry for one hull class, in the canonical north frame:
/// beam along x, length along y, bow toward negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullPlan {
    pub class: HullClass,
    pub half_beam: i32,
    pub half_length: i32,
}

impl HullPlan {
    pub fn of(class: HullClass) -> Self {
        let half_length = match class {
            HullClass::Small => 3,
            HullClass::Medium => 4,
            HullClass::Large => 5,
        };
        Self {
            class,
            half_beam: 1,
            half_length,
        }
    }

    /// Fixture offset in the canonical north frame.
    fn frame_fixture(self, fixture: Fixture) -> (i32, i32) {
        match fixture {
            Fixture::Helm => (0, self.half_length),
            Fixture::Hold => (0, -self.half_length),
            Fixture::PortPlank => (-self.half_beam, 0),
            Fixture::StarboardPlank => (self.half_beam, 0),
        }
    }

    /// Fixture offset from the origin for a hull at the given facing.
    pub fn fixture_offset(self, fixture: Fixture, facing: Facing) -> (i32, i32) {
        let (dx, dy) = self.frame_fixture(fixture);
        rotate_offset(dx, dy, facing.quarters())
    }

    /// Whether the relative offset `(dx, dy)` lies inside the footprint at
    /// the given facing. O(1): un-rotates into the canonical frame.
    pub fn covers(self, facing: Facing, dx: i32, dy: i32) -> bool {
        let (fx, fy) = rotate_offset(dx, dy, -facing.quarters());
        fx.abs() <= self.half_beam && fy.abs() <= self.half_length
    }

    /// All relative cell offsets for the given facing.
    pub fn offsets(self, facing: Facing) -> Vec<(i32, i32)> {
        let mut cells =
            Vec::with_capacity(((2 * self.half_beam + 1) * (2 * self.half_length + 1)) as usize);
        for fx in -self.half_beam..=self.half_beam {
            for fy in -self.half_length..=self.half_length {
                cells.push(rotate_offset(fx, fy, facing.quarters()));
            }
        }
        cells
    }

    /// Absolute cells occupied by a hull at `origin` with the given facing.
    pub fn cells(self, origin: CellPos, facing: Facing) -> Vec<CellPos> {
        self.offsets(facing)
            .into_iter()
            .map(|(dx, dy)| origin.shifted(dx, dy))
            .collect()
    }

    /// Bounding rectangle of the footprint at `origin` with the given facing.
    pub fn bounding_rect(self, origin: CellPos, facing: Facing) -> Rect {
        let (hx, hy) = match facing {
            Facing::North | Facing::South => (self.half_beam, self.half_length),
            Facing::East | Facing::West => (self.half_length, self.half_beam),
        };
        Rect::new(origin.x - hx, origin.y - hy, origin.x + hx, origin.y + hy)
    }
}
