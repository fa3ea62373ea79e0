//! Helm command protocol — the discrete orders the dispatcher feeds us, and
//! the authorization gate in front of every one of them.
//!
//! Orders arrive already parsed; this module authorizes the actor, applies
//! precondition checks, and routes to the movement, navigation, or naming
//! logic, turning refusals into narrative lines for the right audience.

use rand::Rng;

use tidecraft_logic::access::{decide_helm, HelmDenial, HelmRequest, Petitioner};
use tidecraft_logic::grid::Heading;
use tidecraft_logic::messages::{self, Refusal};

use crate::components::{Inventory, Mobile, Position, Remains};
use crate::events::Audience;
use crate::movement::{self, GaitKind};
use crate::navigation::{self, CourseStart};
use crate::vessel::{Vessel, VesselId};
use crate::world::{Ctx, Zone};

/// Every order the helm understands. The speech dispatcher maps keywords to
/// these; administrative property sets and navigation ticks use the same
/// entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelmOrder {
    // Naming
    SetName(String),
    ClearName,
    QueryName,
    // Directional starts, fast and slow, plus single steps
    Start { heading: Heading, gait: GaitKind },
    Step { heading: Heading },
    // Stop and anchor
    Stop,
    LowerAnchor,
    RaiseAnchor,
    // Turns
    TurnRight,
    TurnLeft,
    TurnAbout,
    // Navigation
    QueryNavPoint,
    StartCourse,
    ContinueCourse,
    GotoLeg(usize),
    SingleLeg(usize),
}

/// Gather the occupant roster the pure authorization check decides over.
fn gather_roster(zone: &Zone, vessel: &Vessel) -> Vec<Petitioner> {
    let helm = vessel.helm_cell();
    let key = vessel.key;

    // Key values sitting inside corpses aboard, owed to their late holders.
    let mut dead_holders: Vec<u64> = Vec::new();
    if zone.rules.honor_dead_holders {
        for (_, (pos, remains, inv)) in zone
            .objects
            .query::<(&Position, &Remains, &Inventory)>()
            .iter()
        {
            if vessel.contains(pos.cell) && inv.holds_key(key) {
                dead_holders.push(remains.of);
            }
        }
    }

    let mut roster = Vec::new();
    for (entity, (pos, mobile, inv)) in zone
        .objects
        .query::<(&Position, &Mobile, Option<&Inventory>)>()
        .iter()
    {
        if !vessel.contains(pos.cell) {
            continue;
        }
        let bits = entity.to_bits().get();
        let holds_key = inv.map(|i| i.holds_key(key)).unwrap_or(false)
            || dead_holders.contains(&bits);
        roster.push(Petitioner {
            id: bits,
            is_staff: mobile.is_staff,
            holds_key,
            dist_sq: pos.cell.planar_dist_sq(helm),
        });
    }
    roster
}

/// A movable, non-exempt object on a helm-adjacent deck cell jams commands.
fn deck_jammed(zone: &Zone, vessel: &Vessel) -> bool {
    let helm = vessel.helm_cell();
    let neighbors = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    for (dx, dy) in neighbors {
        let cell = helm.shifted(dx, dy);
        if !vessel.contains(cell) {
            continue;
        }
        for body in zone.bodies_in(&tidecraft_logic::grid::Rect::new(
            cell.x, cell.y, cell.x, cell.y,
        )) {
            // Actors are occupants, not jams.
            let Some(kind) = body.kind else { continue };
            if body.movable && !zone.classify.category(kind).never_blocks() {
                return true;
            }
        }
    }
    false
}

/// Handle one helm order from an actor. All feedback goes through the
/// outbox; state only changes when the order passes every gate.
pub fn helm_order(cx: &mut Ctx, id: VesselId, actor: hecs::Entity, order: HelmOrder) {
    let actor_bits = actor.to_bits().get();

    let decision = {
        let Some(vessel) = cx.zone.vessels.get(id) else {
            return;
        };
        decide_helm(&HelmRequest {
            actor: actor_bits,
            deck_jammed: deck_jammed(cx.zone, vessel),
            roster: gather_roster(cx.zone, vessel),
        })
    };

    if !decision.allowed {
        let line = match decision.denial {
            Some(HelmDenial::DeckJammed) => messages::refusal_line(Refusal::DeckJammed),
            Some(HelmDenial::NotAboard) => messages::refusal_line(Refusal::NotAboard),
            _ => {
                let roll = rand::thread_rng().gen_range(0..messages::HELM_REFUSALS.len());
                messages::helm_refusal(roll)
            }
        };
        cx.outbox.line(Audience::Actor(actor_bits), line);
        return;
    }

    let outcome: Result<(), Refusal> = match order {
        HelmOrder::SetName(name) => {
            let vessel = cx.zone.vessels.get_mut(id).expect("checked");
            vessel.name = Some(name.clone());
            cx.outbox
                .line(Audience::Deck(id), format!("The vessel is now called {name}."));
            Ok(())
        }
        HelmOrder::ClearName => {
            let vessel = cx.zone.vessels.get_mut(id).expect("checked");
            vessel.name = None;
            cx.outbox
                .line(Audience::Deck(id), messages::LINE_NAME_CLEARED);
            Ok(())
        }
        HelmOrder::QueryName => {
            let vessel = cx.zone.vessels.get(id).expect("checked");
            let line = match &vessel.name {
                Some(name) => format!("She is called {name}."),
                None => "She has no name.".to_string(),
            };
            cx.outbox.line(Audience::Actor(actor_bits), line);
            Ok(())
        }
        HelmOrder::Start { heading, gait } => {
            movement::start_moving(cx, id, heading, gait, false)
        }
        HelmOrder::Step { heading } => {
            movement::start_moving(cx, id, heading, GaitKind::Slow, true)
        }
        HelmOrder::Stop => {
            movement::stop_moving(cx, id);
            Ok(())
        }
        HelmOrder::LowerAnchor => movement::lower_anchor(cx, id),
        HelmOrder::RaiseAnchor => movement::raise_anchor(cx, id),
        HelmOrder::TurnRight => manual_turn(cx, id, 1),
        HelmOrder::TurnLeft => manual_turn(cx, id, -1),
        HelmOrder::TurnAbout => manual_turn(cx, id, 2),
        HelmOrder::QueryNavPoint => match navigation::nav_point(cx, id) {
            Ok((leg, pin)) => {
                cx.outbox.line(
                    Audience::Actor(actor_bits),
                    format!("Next mark is leg {leg} at ({}, {}).", pin.x, pin.y),
                );
                Ok(())
            }
            Err(refusal) => Err(refusal),
        },
        HelmOrder::StartCourse => navigation::start_course(cx, id, CourseStart::Restart),
        HelmOrder::ContinueCourse => navigation::start_course(cx, id, CourseStart::Continue),
        HelmOrder::GotoLeg(n) => navigation::start_course(cx, id, CourseStart::Leg(n)),
        HelmOrder::SingleLeg(n) => navigation::start_course(cx, id, CourseStart::SingleLeg(n)),
    };

    if let Err(refusal) = outcome {
        cx.outbox
            .line(Audience::Actor(actor_bits), messages::refusal_line(refusal));
    }
}

/// A manual turn abandons any course in progress before scheduling.
fn manual_turn(cx: &mut Ctx, id: VesselId, quarters: i8) -> Result<(), Refusal> {
    if let Some(vessel) = cx.zone.vessels.get_mut(id) {
        vessel.nav_task = None;
    }
    movement::begin_turn(cx, id, quarters)
}
