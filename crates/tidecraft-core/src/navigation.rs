//! Course following — waypoint navigation on top of the movement controller.
//!
//! A course tick behaves like a movement tick except that direction and
//! distance are re-plotted toward the current pin every time, a perpendicular
//! bearing chains a turn before the next step, and arrival advances the leg.

use tidecraft_logic::constants::gait;
use tidecraft_logic::course::{plot_leg, LegStep};
use tidecraft_logic::grid::{CellPos, Heading};
use tidecraft_logic::messages::{self, Refusal};

use crate::components::{Chart, Position};
use crate::events::Audience;
use crate::movement::{self, StepOutcome};
use crate::scheduler::{Task, TaskId};
use crate::vessel::{MovementState, Underway, VesselId};
use crate::world::Ctx;

/// How to enter a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStart {
    /// Reset to the first leg and sail the full course.
    Restart,
    /// Resume from the current leg.
    Continue,
    /// Jump to a leg and sail the rest of the course.
    Leg(usize),
    /// Jump to a leg and halt on reaching it.
    SingleLeg(usize),
}

/// Pins on the assigned chart, if it still exists in the world.
fn chart_pins(cx: &Ctx, chart_bits: u64) -> Option<(hecs::Entity, Vec<CellPos>)> {
    let entity = hecs::Entity::from_bits(chart_bits)?;
    let pins = cx.zone.objects.get::<&Chart>(entity).ok()?.pins.clone();
    Some((entity, pins))
}

/// Start or resume following the assigned chart.
pub fn start_course(cx: &mut Ctx, id: VesselId, start: CourseStart) -> Result<(), Refusal> {
    let now = cx.now;
    let (chart_bits, current_leg) = {
        let vessel = cx.zone.vessels.get(id).ok_or(Refusal::NotAboard)?;
        if vessel.is_decaying() {
            return Err(Refusal::Foundering);
        }
        if vessel.anchored {
            return Err(Refusal::Anchored);
        }
        let course = vessel.nav.ok_or(Refusal::NoChart)?;
        (course.chart, course.next_leg)
    };

    let (chart_entity, pins) = chart_pins(cx, chart_bits).ok_or(Refusal::NoChart)?;

    // The chart artifact itself must be riding the vessel.
    {
        let vessel = cx.zone.vessels.get(id).expect("checked");
        let aboard = cx
            .zone
            .objects
            .get::<&Position>(chart_entity)
            .map(|p| vessel.contains(p.cell))
            .unwrap_or(false);
        if !aboard {
            return Err(Refusal::ChartNotAboard);
        }
    }

    let (leg, single) = match start {
        CourseStart::Restart => (0, false),
        CourseStart::Continue => (current_leg, false),
        CourseStart::Leg(n) => (n, false),
        CourseStart::SingleLeg(n) => (n, true),
    };
    if leg >= pins.len() {
        return Err(Refusal::BadLeg);
    }

    let vessel = cx.zone.vessels.get_mut(id).expect("checked");
    let course = vessel.nav.as_mut().expect("checked");
    course.next_leg = leg;
    course.single_leg = single;
    vessel.state = MovementState::Moving(Underway {
        heading: Heading::Forward,
        speed: gait::SLOW_SPEED,
        one_shot: false,
        interval: gait::SLOW_INTERVAL,
    });
    vessel.move_task = None;
    vessel.turn_task = None;
    vessel.nav_task = Some(cx.scheduler.schedule(now + gait::SLOW_INTERVAL, id, Task::NavTick));
    log::debug!("{} sailing for leg {}", id, leg);
    Ok(())
}

/// The current leg index and pin, for the query command.
pub fn nav_point(cx: &Ctx, id: VesselId) -> Result<(usize, CellPos), Refusal> {
    let vessel = cx.zone.vessels.get(id).ok_or(Refusal::NotAboard)?;
    let course = vessel.nav.ok_or(Refusal::NoChart)?;
    let (_, pins) = chart_pins(cx, course.chart).ok_or(Refusal::NoChart)?;
    let pin = pins.get(course.next_leg).copied().ok_or(Refusal::BadLeg)?;
    Ok((course.next_leg, pin))
}

fn halt_course(cx: &mut Ctx, id: VesselId) {
    if let Some(vessel) = cx.zone.vessels.get_mut(id) {
        movement::halt(vessel);
    }
}

/// Recurring navigation tick.
pub fn nav_tick(cx: &mut Ctx, id: VesselId, task: TaskId) {
    let now = cx.now;
    let (origin, facing, course, turning) = {
        let Some(vessel) = cx.zone.vessels.get(id) else {
            return;
        };
        if vessel.nav_task != Some(task) {
            return; // superseded
        }
        let Some(course) = vessel.nav else {
            return;
        };
        (
            vessel.origin,
            vessel.facing,
            course,
            matches!(vessel.state, MovementState::Turning { .. }),
        )
    };

    // Mid-turn: wait for the commit, then re-plot.
    if turning {
        let vessel = cx.zone.vessels.get_mut(id).expect("checked");
        vessel.nav_task = Some(cx.scheduler.schedule(
            now + tidecraft_logic::constants::TURN_DELAY + 1,
            id,
            Task::NavTick,
        ));
        return;
    }

    let Some((_, pins)) = chart_pins(cx, course.chart) else {
        cx.outbox
            .line(Audience::Deck(id), messages::refusal_line(Refusal::NoChart));
        halt_course(cx, id);
        return;
    };
    let Some(pin) = pins.get(course.next_leg).copied() else {
        halt_course(cx, id);
        return;
    };

    match plot_leg((origin.x, origin.y), (pin.x, pin.y), facing) {
        LegStep::Arrived => {
            let last = course.next_leg + 1 >= pins.len();
            if course.single_leg || last {
                let line = if last {
                    messages::LINE_COURSE_COMPLETE
                } else {
                    messages::LINE_LEG_REACHED
                };
                cx.outbox.line(Audience::Deck(id), line);
                halt_course(cx, id);
            } else {
                let vessel = cx.zone.vessels.get_mut(id).expect("checked");
                vessel.nav.as_mut().expect("checked").next_leg += 1;
                cx.outbox
                    .line(Audience::Deck(id), messages::LINE_LEG_REACHED);
                vessel.nav_task =
                    Some(cx.scheduler.schedule(now + gait::SLOW_INTERVAL, id, Task::NavTick));
            }
        }
        LegStep::Steer { to } => {
            let quarters = facing.quarter_turns_to(to);
            if movement::begin_turn(cx, id, quarters).is_err() {
                halt_course(cx, id);
                return;
            }
            let vessel = cx.zone.vessels.get_mut(id).expect("checked");
            vessel.nav_task = Some(cx.scheduler.schedule(
                now + tidecraft_logic::constants::TURN_DELAY + 1,
                id,
                Task::NavTick,
            ));
        }
        LegStep::Advance { dir, cells } => {
            let steps = cells.min(gait::SLOW_SPEED as i32);
            for step in 0..steps {
                match movement::try_step(cx, id, dir.0, dir.1) {
                    StepOutcome::Moved => {}
                    StepOutcome::Forbidden => {
                        if step == 0 {
                            cx.outbox.line(
                                Audience::Deck(id),
                                messages::refusal_line(Refusal::ForbiddenWaters),
                            );
                            halt_course(cx, id);
                            return;
                        }
                        break;
                    }
                    StepOutcome::Hard => {
                        if step == 0 {
                            cx.outbox.line(Audience::Deck(id), messages::LINE_STOPPED);
                            halt_course(cx, id);
                            return;
                        }
                        break;
                    }
                    StepOutcome::Soft(hits) => {
                        if step == 0 {
                            movement::sinkable_contact(cx, id, hits);
                            cx.outbox.line(Audience::Deck(id), messages::LINE_STOPPED);
                            halt_course(cx, id);
                            return;
                        }
                        break;
                    }
                }
            }

            let heading =
                Heading::from_world(facing, dir.0, dir.1).unwrap_or(Heading::Forward);
            let interval = gait::SLOW_INTERVAL
                + if heading.is_drift() {
                    gait::DRIFT_PENALTY
                } else {
                    0
                };
            let vessel = cx.zone.vessels.get_mut(id).expect("checked");
            vessel.state = MovementState::Moving(Underway {
                heading,
                speed: gait::SLOW_SPEED,
                one_shot: false,
                interval,
            });
            vessel.nav_task = Some(cx.scheduler.schedule(now + interval, id, Task::NavTick));
        }
    }
}
