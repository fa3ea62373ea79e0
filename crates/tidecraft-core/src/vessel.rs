//! The vessel aggregate — hull, fixtures, movement state, and lifecycle.
//!
//! Fixtures (helm, hold, planks) are value records owned by the vessel.
//! Their absolute cells are always derived from the origin and facing at the
//! moment of asking; nothing stores them independently, so they cannot drift
//! from the hull.

use serde::{Deserialize, Serialize};

use tidecraft_logic::footprint::{Fixture, HullClass, HullPlan};
use tidecraft_logic::grid::{CellPos, Facing, Heading, Rect};
use tidecraft_logic::messages::Refusal;

use crate::collision::{can_fit, Fit, Probe};
use crate::components::KeyValue;
use crate::events::SimEvent;
use crate::scheduler::{TaskId, Tick};
use crate::world::Ctx;

/// Registry identifier for a vessel. Not an ECS entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VesselId(pub u64);

impl std::fmt::Display for VesselId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vessel#{}", self.0)
    }
}

/// Which boarding door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlankSide {
    Port,
    Starboard,
}

impl PlankSide {
    pub fn fixture(self) -> Fixture {
        match self {
            PlankSide::Port => Fixture::PortPlank,
            PlankSide::Starboard => Fixture::StarboardPlank,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlankSide::Port => 0,
            PlankSide::Starboard => 1,
        }
    }
}

/// A boarding door. Open planks swing shut on their own once the cell
/// beneath them is clear.
#[derive(Debug, Clone)]
pub struct Plank {
    pub side: PlankSide,
    pub key: KeyValue,
    pub open: bool,
    pub close_task: Option<TaskId>,
}

impl Plank {
    fn new(side: PlankSide, key: KeyValue) -> Self {
        Self {
            side,
            key,
            open: false,
            close_task: None,
        }
    }
}

/// One stowed lot in the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stowed {
    pub kind: u16,
    pub amount: u16,
}

/// The cargo container at the bow.
#[derive(Debug, Clone)]
pub struct Hold {
    pub key: KeyValue,
    pub capacity: u16,
    pub contents: Vec<Stowed>,
}

impl Hold {
    fn new(key: KeyValue, capacity: u16) -> Self {
        Self {
            key,
            capacity,
            contents: Vec::new(),
        }
    }

    /// Lots currently stowed.
    pub fn stored(&self) -> u16 {
        self.contents.iter().map(|s| s.amount).sum()
    }
}

/// An assigned course: which chart to follow and where along it we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Entity bits of the chart artifact.
    pub chart: u64,
    pub next_leg: usize,
    /// Halt after the next arrival instead of sailing the full course.
    pub single_leg: bool,
}

/// Parameters of an in-progress movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underway {
    pub heading: Heading,
    pub speed: u8,
    pub one_shot: bool,
    pub interval: Tick,
}

/// Mutually exclusive movement states. Stationary is `Idle`; whether the
/// anchor is down is the separate [`Vessel::anchored`] flag, which is what
/// refuses movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    Moving(Underway),
    Turning { quarters: i8 },
    Decaying { stage: u8 },
}

/// The aggregate root: a movable, rotatable multi-cell hull with rigid
/// fixtures, commanded from its helm.
pub struct Vessel {
    pub id: VesselId,
    pub class: HullClass,
    pub origin: CellPos,
    pub facing: Facing,
    pub anchored: bool,
    pub state: MovementState,
    pub name: Option<String>,
    /// Owning actor, by entity bits.
    pub owner: Option<u64>,
    pub key: KeyValue,
    pub decay_deadline: Tick,
    pub staff_exempt: bool,
    pub hold: Hold,
    pub planks: [Plank; 2],
    pub nav: Option<Course>,

    /// Obstruction set of the last soft-blocked step; second contact with
    /// the same set starts sinking it.
    pub graze: Vec<u64>,

    // Live task handles; a scheduler entry whose id is no longer recorded
    // here is stale and gets dropped at dispatch.
    pub move_task: Option<TaskId>,
    pub turn_task: Option<TaskId>,
    pub nav_task: Option<TaskId>,
    pub decay_task: Option<TaskId>,
}

impl Vessel {
    pub fn plan(&self) -> HullPlan {
        self.class.plan()
    }

    /// Planar footprint membership at the current position and facing.
    pub fn contains(&self, cell: CellPos) -> bool {
        self.plan()
            .covers(self.facing, cell.x - self.origin.x, cell.y - self.origin.y)
    }

    pub fn bounding_rect(&self) -> Rect {
        self.plan().bounding_rect(self.origin, self.facing)
    }

    /// Absolute cell of a fixture, derived from origin and facing.
    pub fn fixture_cell(&self, fixture: Fixture) -> CellPos {
        let (dx, dy) = self.plan().fixture_offset(fixture, self.facing);
        self.origin.shifted(dx, dy)
    }

    pub fn helm_cell(&self) -> CellPos {
        self.fixture_cell(Fixture::Helm)
    }

    pub fn plank(&self, side: PlankSide) -> &Plank {
        &self.planks[side.index()]
    }

    pub fn plank_mut(&mut self, side: PlankSide) -> &mut Plank {
        &mut self.planks[side.index()]
    }

    /// Moving or turning; the hold refuses service while this holds.
    pub fn is_underway(&self) -> bool {
        matches!(
            self.state,
            MovementState::Moving(_) | MovementState::Turning { .. }
        )
    }

    pub fn is_decaying(&self) -> bool {
        matches!(self.state, MovementState::Decaying { .. })
    }
}

/// All live vessels of a zone. Owned by the zone and passed by reference;
/// never a process-wide collection.
#[derive(Default)]
pub struct VesselRegistry {
    next: u64,
    vessels: std::collections::BTreeMap<VesselId, Vessel>,
}

impl VesselRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.get(&id)
    }

    pub fn get_mut(&mut self, id: VesselId) -> Option<&mut Vessel> {
        self.vessels.get_mut(&id)
    }

    pub fn remove(&mut self, id: VesselId) -> Option<Vessel> {
        self.vessels.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VesselId, &Vessel)> {
        self.vessels.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    /// Insert a freshly built vessel under a new id.
    fn insert_new(&mut self, mut vessel: Vessel) -> VesselId {
        self.next += 1;
        let id = VesselId(self.next);
        vessel.id = id;
        self.vessels.insert(id, vessel);
        id
    }

    /// Re-insert a restored vessel under its persisted id.
    pub fn insert_restored(&mut self, vessel: Vessel) {
        self.next = self.next.max(vessel.id.0);
        self.vessels.insert(vessel.id, vessel);
    }
}

/// A dry-docked vessel, reduced back to a placeable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeedToken {
    pub class: HullClass,
}

/// Why a placement attempt failed.
#[derive(Debug)]
pub enum PlacementError {
    /// The candidate footprint does not fit the water there.
    Obstructed,
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::Obstructed => write!(f, "the vessel cannot fit there"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Place a vessel from a deed token. Validates the fit, mints the shared
/// key, cuts it onto both planks and the hold, and sets the vessel anchored.
pub fn place_vessel(
    cx: &mut Ctx,
    token: DeedToken,
    origin: CellPos,
    facing: Facing,
    owner: Option<u64>,
) -> Result<VesselId, PlacementError> {
    let probe = Probe::place(token.class, origin, facing);
    if !matches!(can_fit(cx.zone, &probe), Fit::Clear) {
        return Err(PlacementError::Obstructed);
    }

    let key: KeyValue = rand::random::<KeyValue>() | 1; // never zero
    let vessel = Vessel {
        id: VesselId(0), // assigned by the registry
        class: token.class,
        origin,
        facing,
        anchored: true,
        state: MovementState::Idle,
        name: None,
        owner,
        key,
        decay_deadline: 0,
        staff_exempt: false,
        hold: Hold::new(key, token.class.hold_capacity()),
        planks: [
            Plank::new(PlankSide::Port, key),
            Plank::new(PlankSide::Starboard, key),
        ],
        nav: None,
        graze: Vec::new(),
        move_task: None,
        turn_task: None,
        nav_task: None,
        decay_task: None,
    };
    let id = cx.zone.vessels.insert_new(vessel);
    crate::decay::reset_deadline(cx, id);
    cx.outbox.push(SimEvent::Placed(id));
    log::info!(
        "placed {} ({:?}) at {:?} facing {:?} on plane {}",
        id,
        token.class,
        origin,
        facing,
        cx.zone.map.plane()
    );
    Ok(id)
}

/// Dry-dock a vessel back into a deed token. The hold must be empty.
pub fn dry_dock(cx: &mut Ctx, id: VesselId) -> Result<DeedToken, Refusal> {
    let vessel = cx.zone.vessels.get(id).ok_or(Refusal::NotAboard)?;
    if vessel.is_decaying() {
        return Err(Refusal::Foundering);
    }
    if vessel.hold.stored() > 0 {
        return Err(Refusal::DryDockLaden);
    }
    let vessel = cx.zone.vessels.remove(id).expect("checked above");
    cx.outbox.push(SimEvent::Docked(id));
    log::info!("dry-docked {}", id);
    Ok(DeedToken {
        class: vessel.class,
    })
}
