//! Grid primitives — cells, facings, headings, exact quarter-turn rotation.
//!
//! All rotation here is integer and exact: a quarter turn clockwise maps
//! `(x, y)` to `(-y, x)`, and four quarter turns are the identity on every
//! offset. North is negative y, east is positive x.

use serde::{Deserialize, Serialize};

/// A world grid cell: planar coordinates plus elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i8,
}

impl CellPos {
    pub fn new(x: i32, y: i32, z: i8) -> Self {
        Self { x, y, z }
    }

    /// This cell shifted by a planar delta, elevation unchanged.
    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    /// Squared planar distance, ignoring elevation.
    pub fn planar_dist_sq(self, other: CellPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// One of the four orthogonal hull facings. Diagonals are movement vectors
/// ([`Heading`]), never stored facings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    /// Quarter-turn index: North 0, East 1, South 2, West 3.
    pub fn quarters(self) -> i8 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    fn from_quarters(q: i8) -> Facing {
        match q.rem_euclid(4) {
            0 => Facing::North,
            1 => Facing::East,
            2 => Facing::South,
            _ => Facing::West,
        }
    }

    /// This facing rotated by a signed number of quarter turns (positive is
    /// clockwise).
    pub fn rotated(self, quarters: i8) -> Facing {
        Facing::from_quarters(self.quarters() + quarters)
    }

    /// Unit vector pointing along this facing. North is (0, -1).
    pub fn unit(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    /// The facing whose unit vector matches `(dx, dy)`, for cardinal signum
    /// vectors only.
    pub fn of_vector(dx: i32, dy: i32) -> Option<Facing> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Facing::North),
            (1, 0) => Some(Facing::East),
            (0, 1) => Some(Facing::South),
            (-1, 0) => Some(Facing::West),
            _ => None,
        }
    }

    /// Shortest signed quarter-turn count from `self` to `to`:
    /// -1, 0, 1 or 2.
    pub fn quarter_turns_to(self, to: Facing) -> i8 {
        match (to.quarters() - self.quarters()).rem_euclid(4) {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => -1,
        }
    }
}

/// A steer direction relative to the hull's facing. Eight-way: the diagonals
/// and beam directions are drifts, fore and aft are straight gaits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Forward,
    ForwardRight,
    Right,
    BackRight,
    Backward,
    BackLeft,
    Left,
    ForwardLeft,
}

impl Heading {
    /// All eight headings, clockwise from dead ahead.
    pub const ALL: [Heading; 8] = [
        Heading::Forward,
        Heading::ForwardRight,
        Heading::Right,
        Heading::BackRight,
        Heading::Backward,
        Heading::BackLeft,
        Heading::Left,
        Heading::ForwardLeft,
    ];

    /// Whether this heading is a drift (anything but dead ahead or astern).
    pub fn is_drift(self) -> bool {
        !matches!(self, Heading::Forward | Heading::Backward)
    }

    /// Offset of one step in the hull frame (facing North).
    fn frame_offset(self) -> (i32, i32) {
        match self {
            Heading::Forward => (0, -1),
            Heading::ForwardRight => (1, -1),
            Heading::Right => (1, 0),
            Heading::BackRight => (1, 1),
            Heading::Backward => (0, 1),
            Heading::BackLeft => (-1, 1),
            Heading::Left => (-1, 0),
            Heading::ForwardLeft => (-1, -1),
        }
    }

    /// World-frame step vector for a hull at the given facing.
    pub fn world_vector(self, facing: Facing) -> (i32, i32) {
        let (dx, dy) = self.frame_offset();
        rotate_offset(dx, dy, facing.quarters())
    }

    /// The heading that produces the given world-frame step vector at the
    /// given facing, for signum vectors other than (0, 0).
    pub fn from_world(facing: Facing, dx: i32, dy: i32) -> Option<Heading> {
        let frame = rotate_offset(dx.signum(), dy.signum(), -facing.quarters());
        Heading::ALL.into_iter().find(|h| h.frame_offset() == frame)
    }
}

/// Rotate a relative offset by a signed number of quarter turns (positive is
/// clockwise). Exact: four turns are the identity.
pub fn rotate_offset(dx: i32, dy: i32, quarters: i8) -> (i32, i32) {
    match quarters.rem_euclid(4) {
        0 => (dx, dy),
        1 => (-dy, dx),
        2 => (-dx, -dy),
        _ => (dy, -dx),
    }
}

/// Inclusive axis-aligned cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    pub fn contains_cell(&self, cell: CellPos) -> bool {
        self.contains(cell.x, cell.y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }
}

/// Wrap a candidate cell crossing the edge of a bounding rectangle to the
/// opposite edge, per axis. Cells inside the rectangle are unchanged.
pub fn wrap_into(rect: &Rect, x: i32, y: i32) -> (i32, i32) {
    let wx = if x < rect.x1 {
        rect.x2 - (rect.x1 - x - 1)
    } else if x > rect.x2 {
        rect.x1 + (x - rect.x2 - 1)
    } else {
        x
    };
    let wy = if y < rect.y1 {
        rect.y2 - (rect.y1 - y - 1)
    } else if y > rect.y2 {
        rect.y1 + (y - rect.y2 - 1)
    } else {
        y
    };
    (wx, wy)
}
