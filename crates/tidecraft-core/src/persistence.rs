//! Fleet save/load — a versioned bincode envelope of vessel records.
//!
//! Records round-trip exactly. Loading an older format applies the upgrade
//! table (v1 predates staff exemption and navigation; both default off).
//! An unknown version tag is a fatal load error on purpose — silent recovery
//! would hide operator problems.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use tidecraft_logic::footprint::HullClass;
use tidecraft_logic::grid::{CellPos, Facing};

use crate::components::KeyValue;
use crate::scheduler::{Task, Tick};
use crate::vessel::{
    Course, Hold, MovementState, Plank, PlankSide, Stowed, Vessel, VesselId,
};
use crate::world::Ctx;

/// Current save format version. Bump when the record shape changes and add
/// the old shape to the upgrade path below.
const SAVE_VERSION: u32 = 2;

/// Outer envelope: version tag plus the version-specific record payload.
#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlankRecord {
    pub side: PlankSide,
    pub key: KeyValue,
    pub open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldRecord {
    pub key: KeyValue,
    pub capacity: u16,
    pub contents: Vec<Stowed>,
}

/// One persisted vessel. Movement state and task handles are transient and
/// deliberately absent: a loaded vessel comes back idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselRecord {
    pub id: u64,
    pub class: HullClass,
    pub origin: CellPos,
    pub facing: Facing,
    pub anchored: bool,
    pub name: Option<String>,
    pub owner: Option<u64>,
    pub key: KeyValue,
    pub decay_deadline: Tick,
    pub staff_exempt: bool,
    pub nav: Option<Course>,
    pub hold: HoldRecord,
    pub planks: [PlankRecord; 2],
}

/// The v1 record, before staff exemption and navigation existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VesselRecordV1 {
    id: u64,
    class: HullClass,
    origin: CellPos,
    facing: Facing,
    anchored: bool,
    name: Option<String>,
    owner: Option<u64>,
    key: KeyValue,
    decay_deadline: Tick,
    hold: HoldRecord,
    planks: [PlankRecord; 2],
}

impl VesselRecordV1 {
    /// Upgrade table: v1 → v2 defaults `staff_exempt = false`, `nav = None`.
    fn upgrade(self) -> VesselRecord {
        VesselRecord {
            id: self.id,
            class: self.class,
            origin: self.origin,
            facing: self.facing,
            anchored: self.anchored,
            name: self.name,
            owner: self.owner,
            key: self.key,
            decay_deadline: self.decay_deadline,
            staff_exempt: false,
            nav: None,
            hold: self.hold,
            planks: self.planks,
        }
    }
}

/// Errors during save or load.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Encode(Box<bincode::ErrorKind>),
    /// The file's version tag is newer or stranger than anything we know.
    UnknownVersion { found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Encode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Encode(e) => write!(f, "Serialization error: {}", e),
            SaveError::UnknownVersion { found } => {
                write!(f, "Unknown save version {} (current is {})", found, SAVE_VERSION)
            }
        }
    }
}

impl std::error::Error for SaveError {}

fn record_of(vessel: &Vessel) -> VesselRecord {
    VesselRecord {
        id: vessel.id.0,
        class: vessel.class,
        origin: vessel.origin,
        facing: vessel.facing,
        anchored: vessel.anchored,
        name: vessel.name.clone(),
        owner: vessel.owner,
        key: vessel.key,
        decay_deadline: vessel.decay_deadline,
        staff_exempt: vessel.staff_exempt,
        nav: vessel.nav,
        hold: HoldRecord {
            key: vessel.hold.key,
            capacity: vessel.hold.capacity,
            contents: vessel.hold.contents.clone(),
        },
        planks: [
            PlankRecord {
                side: vessel.planks[0].side,
                key: vessel.planks[0].key,
                open: vessel.planks[0].open,
            },
            PlankRecord {
                side: vessel.planks[1].side,
                key: vessel.planks[1].key,
                open: vessel.planks[1].open,
            },
        ],
    }
}

/// Write every vessel of the zone to `writer`.
pub fn save_fleet<W: Write>(cx: &Ctx, writer: W) -> Result<(), SaveError> {
    let records: Vec<VesselRecord> = cx.zone.vessels.iter().map(|(_, v)| record_of(v)).collect();
    let envelope = Envelope {
        version: SAVE_VERSION,
        payload: bincode::serialize(&records)?,
    };
    bincode::serialize_into(writer, &envelope)?;
    Ok(())
}

/// Read a fleet snapshot, upgrading legacy formats.
pub fn load_fleet<R: Read>(reader: R) -> Result<Vec<VesselRecord>, SaveError> {
    let envelope: Envelope = bincode::deserialize_from(reader)?;
    match envelope.version {
        1 => {
            let old: Vec<VesselRecordV1> = bincode::deserialize(&envelope.payload)?;
            Ok(old.into_iter().map(VesselRecordV1::upgrade).collect())
        }
        2 => Ok(bincode::deserialize(&envelope.payload)?),
        other => Err(SaveError::UnknownVersion { found: other }),
    }
}

/// Rebuild vessels from records. Loaded vessels come back idle with their
/// decay deadlines rescheduled as stored.
pub fn restore_fleet(cx: &mut Ctx, records: Vec<VesselRecord>) {
    for record in records {
        let id = VesselId(record.id);
        let decay_task = if record.staff_exempt {
            None
        } else {
            Some(cx.scheduler.schedule(record.decay_deadline, id, Task::DecayDue))
        };
        let vessel = Vessel {
            id,
            class: record.class,
            origin: record.origin,
            facing: record.facing,
            anchored: record.anchored,
            state: MovementState::Idle,
            name: record.name,
            owner: record.owner,
            key: record.key,
            decay_deadline: record.decay_deadline,
            staff_exempt: record.staff_exempt,
            hold: Hold {
                key: record.hold.key,
                capacity: record.hold.capacity,
                contents: record.hold.contents,
            },
            planks: record.planks.map(|p| Plank {
                side: p.side,
                key: p.key,
                open: p.open,
                close_task: None,
            }),
            nav: record.nav,
            graze: Vec::new(),
            move_task: None,
            turn_task: None,
            nav_task: None,
            decay_task,
        };
        cx.zone.vessels.insert_restored(vessel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(id: u64) -> VesselRecord {
        VesselRecord {
            id,
            class: HullClass::Medium,
            origin: CellPos::new(120, 80, 0),
            facing: Facing::East,
            anchored: true,
            name: Some("Gull".to_string()),
            owner: Some(42),
            key: 7001,
            decay_deadline: 99_000,
            staff_exempt: true,
            nav: Some(Course {
                chart: 17,
                next_leg: 2,
                single_leg: false,
            }),
            hold: HoldRecord {
                key: 7001,
                capacity: 70,
                contents: vec![Stowed {
                    kind: 130,
                    amount: 3,
                }],
            },
            planks: [
                PlankRecord {
                    side: PlankSide::Port,
                    key: 7001,
                    open: false,
                },
                PlankRecord {
                    side: PlankSide::Starboard,
                    key: 7001,
                    open: true,
                },
            ],
        }
    }

    #[test]
    fn current_format_round_trips_exactly() {
        let records = vec![sample_record(1), sample_record(2)];
        let envelope = Envelope {
            version: SAVE_VERSION,
            payload: bincode::serialize(&records).unwrap(),
        };
        let mut buffer = Vec::new();
        bincode::serialize_into(&mut buffer, &envelope).unwrap();

        let loaded = load_fleet(&buffer[..]).unwrap();
        assert_eq!(loaded.len(), 2);
        let a = &loaded[0];
        assert_eq!(a.id, 1);
        assert_eq!(a.facing, Facing::East);
        assert_eq!(a.nav.unwrap().next_leg, 2);
        assert!(a.staff_exempt);
        assert_eq!(a.hold.contents[0].amount, 3);
        assert!(loaded[1].planks[1].open);
    }

    #[test]
    fn v1_records_upgrade_with_defaults() {
        let old = VesselRecordV1 {
            id: 9,
            class: HullClass::Small,
            origin: CellPos::new(10, 10, 0),
            facing: Facing::North,
            anchored: false,
            name: None,
            owner: None,
            key: 5,
            decay_deadline: 1000,
            hold: HoldRecord {
                key: 5,
                capacity: 40,
                contents: Vec::new(),
            },
            planks: [
                PlankRecord {
                    side: PlankSide::Port,
                    key: 5,
                    open: false,
                },
                PlankRecord {
                    side: PlankSide::Starboard,
                    key: 5,
                    open: false,
                },
            ],
        };
        let envelope = Envelope {
            version: 1,
            payload: bincode::serialize(&vec![old]).unwrap(),
        };
        let mut buffer = Vec::new();
        bincode::serialize_into(&mut buffer, &envelope).unwrap();

        let loaded = load_fleet(&buffer[..]).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].staff_exempt);
        assert!(loaded[0].nav.is_none());
        assert_eq!(loaded[0].decay_deadline, 1000);
    }

    #[test]
    fn unknown_version_is_fatal() {
        let envelope = Envelope {
            version: 99,
            payload: Vec::new(),
        };
        let mut buffer = Vec::new();
        bincode::serialize_into(&mut buffer, &envelope).unwrap();

        match load_fleet(&buffer[..]) {
            Err(SaveError::UnknownVersion { found: 99 }) => {}
            other => panic!("expected UnknownVersion, got {other:?}"),
        }
    }
}
