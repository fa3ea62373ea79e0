//! Inactivity decay — deadline tracking and the destructive countdown.
//!
//! Every successful translation and every explicit refresh pushes the
//! deadline out; staff-exempt vessels never schedule one at all. Once the
//! countdown starts it runs to destruction unless a staff refresh intervenes.

use tidecraft_logic::constants::decay;
use tidecraft_logic::messages;

use crate::events::{Audience, SimEvent};
use crate::scheduler::{Task, TaskId};
use crate::vessel::{MovementState, VesselId};
use crate::world::Ctx;

/// Reset the inactivity deadline to `now + TIMEOUT` and (re)schedule the
/// expiry task. Exempt vessels get neither.
pub fn reset_deadline(cx: &mut Ctx, id: VesselId) {
    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return;
    };
    if vessel.staff_exempt {
        vessel.decay_task = None;
        return;
    }
    vessel.decay_deadline = now + decay::TIMEOUT;
    vessel.decay_task = Some(
        cx.scheduler
            .schedule(vessel.decay_deadline, id, Task::DecayDue),
    );
}

/// Explicit refresh. Regular refreshes cannot interrupt a running countdown;
/// a staff refresh can, restoring the vessel to idle.
pub fn refresh(cx: &mut Ctx, id: VesselId, staff: bool) -> bool {
    let decaying = match cx.zone.vessels.get(id) {
        Some(v) => v.is_decaying(),
        None => return false,
    };
    if decaying {
        if !staff {
            return false;
        }
        let vessel = cx.zone.vessels.get_mut(id).expect("checked");
        vessel.state = MovementState::Idle;
        log::info!("{} countdown cancelled by staff refresh", id);
    }
    reset_deadline(cx, id);
    true
}

/// Deadline expiry: begin the countdown.
pub fn decay_due(cx: &mut Ctx, id: VesselId, task: TaskId) {
    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return;
    };
    if vessel.decay_task != Some(task) {
        return; // refreshed since; stale entry
    }
    if vessel.staff_exempt {
        vessel.decay_task = None;
        return;
    }
    if now < vessel.decay_deadline {
        return;
    }
    vessel.state = MovementState::Decaying { stage: 0 };
    vessel.move_task = None;
    vessel.turn_task = None;
    vessel.nav_task = None;
    vessel.decay_task = Some(
        cx.scheduler
            .schedule(now + decay::STAGE_INTERVAL, id, Task::DecayStage),
    );
    log::info!("{} abandoned; countdown begins", id);
}

/// One countdown stage: the hull settles a z unit and the crew hears it.
/// The final stage destroys the vessel and its fixtures.
pub fn decay_stage(cx: &mut Ctx, id: VesselId, task: TaskId) {
    let now = cx.now;
    let stage = {
        let Some(vessel) = cx.zone.vessels.get_mut(id) else {
            return;
        };
        if vessel.decay_task != Some(task) {
            return;
        }
        let MovementState::Decaying { stage } = vessel.state else {
            return;
        };
        vessel.origin.z -= 1;
        stage
    };

    cx.outbox
        .line(Audience::Deck(id), messages::decay_line(stage));

    let next = stage + 1;
    if next >= decay::STAGES {
        cx.zone.vessels.remove(id);
        cx.outbox.push(SimEvent::Wrecked(id));
        log::info!("{} lost to decay", id);
        return;
    }

    let vessel = cx.zone.vessels.get_mut(id).expect("checked");
    vessel.state = MovementState::Decaying { stage: next };
    vessel.decay_task = Some(
        cx.scheduler
            .schedule(now + decay::STAGE_INTERVAL, id, Task::DecayStage),
    );
}
