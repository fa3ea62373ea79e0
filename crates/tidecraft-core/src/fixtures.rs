//! Fixture operations — boarding planks, the cargo hold, and chart drops on
//! the helm.
//!
//! Fixtures have no position of their own; every operation derives the
//! fixture cell from the vessel's origin and facing at call time.

use tidecraft_logic::constants::PLANK_CLOSE_DELAY;
use tidecraft_logic::hold::{check_hold, HoldDenial, HoldRequest};
use tidecraft_logic::messages::Refusal;

use crate::components::{Chart, Inventory, Position};
use crate::scheduler::{Task, TaskId};
use crate::vessel::{PlankSide, Stowed, VesselId};
use crate::world::Ctx;

/// Whether an actor is aboard and carrying the given key.
fn actor_with_key(cx: &Ctx, id: VesselId, actor: hecs::Entity, key: u32) -> Result<(), Refusal> {
    let vessel = cx.zone.vessels.get(id).ok_or(Refusal::NotAboard)?;
    let cell = cx
        .zone
        .objects
        .get::<&Position>(actor)
        .map(|p| p.cell)
        .map_err(|_| Refusal::NotAboard)?;
    if !vessel.contains(cell) {
        return Err(Refusal::NotAboard);
    }
    let holds = cx
        .zone
        .objects
        .get::<&Inventory>(actor)
        .map(|inv| inv.holds_key(key))
        .unwrap_or(false);
    if holds {
        Ok(())
    } else {
        Err(Refusal::PlankLocked)
    }
}

/// Toggle a plank. Opening schedules the auto-close; closing is immediate.
pub fn toggle_plank(
    cx: &mut Ctx,
    id: VesselId,
    side: PlankSide,
    actor: hecs::Entity,
) -> Result<(), Refusal> {
    let key = cx
        .zone
        .vessels
        .get(id)
        .ok_or(Refusal::NotAboard)?
        .plank(side)
        .key;
    actor_with_key(cx, id, actor, key)?;

    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Ok(());
    };
    let plank = vessel.plank_mut(side);
    if plank.open {
        plank.open = false;
        plank.close_task = None;
    } else {
        plank.open = true;
        plank.close_task = Some(cx.scheduler.schedule(
            now + PLANK_CLOSE_DELAY,
            id,
            Task::PlankClose(side),
        ));
    }
    Ok(())
}

/// Auto-close task: shut the plank once nothing stands on its cell,
/// otherwise wait another delay.
pub fn plank_close(cx: &mut Ctx, id: VesselId, side: PlankSide, task: TaskId) {
    let now = cx.now;
    let occupied = {
        let Some(vessel) = cx.zone.vessels.get(id) else {
            return;
        };
        if vessel.plank(side).close_task != Some(task) {
            return;
        }
        let cell = vessel.fixture_cell(side.fixture());
        cx.zone.cell_occupied(cell)
    };

    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return;
    };
    let plank = vessel.plank_mut(side);
    if occupied {
        plank.close_task = Some(cx.scheduler.schedule(
            now + PLANK_CLOSE_DELAY,
            id,
            Task::PlankClose(side),
        ));
    } else {
        plank.open = false;
        plank.close_task = None;
    }
}

fn hold_denial_to_refusal(denial: HoldDenial) -> Refusal {
    match denial {
        HoldDenial::NotAboard => Refusal::HoldAshore,
        HoldDenial::Locked => Refusal::HoldLocked,
        HoldDenial::Underway => Refusal::HoldUnderway,
        HoldDenial::Overfull => Refusal::HoldOverfull,
    }
}

fn hold_request(cx: &Ctx, id: VesselId, actor: hecs::Entity, stowing: u16) -> Option<HoldRequest> {
    let vessel = cx.zone.vessels.get(id)?;
    let aboard = cx
        .zone
        .objects
        .get::<&Position>(actor)
        .map(|p| vessel.contains(p.cell))
        .unwrap_or(false);
    let has_key = cx
        .zone
        .objects
        .get::<&Inventory>(actor)
        .map(|inv| inv.holds_key(vessel.hold.key))
        .unwrap_or(false);
    Some(HoldRequest {
        aboard,
        has_key,
        underway: vessel.is_underway(),
        stored: vessel.hold.stored(),
        capacity: vessel.hold.capacity,
        stowing,
    })
}

/// Stow a lot into the hold.
pub fn stow(
    cx: &mut Ctx,
    id: VesselId,
    actor: hecs::Entity,
    kind: u16,
    amount: u16,
) -> Result<(), Refusal> {
    let req = hold_request(cx, id, actor, amount).ok_or(Refusal::NotAboard)?;
    check_hold(&req).map_err(hold_denial_to_refusal)?;

    let vessel = cx.zone.vessels.get_mut(id).expect("checked");
    match vessel.hold.contents.iter_mut().find(|s| s.kind == kind) {
        Some(slot) => slot.amount = slot.amount.saturating_add(amount),
        None => vessel.hold.contents.push(Stowed { kind, amount }),
    }
    Ok(())
}

/// Withdraw up to `amount` of a kind; returns what actually came out.
pub fn withdraw(
    cx: &mut Ctx,
    id: VesselId,
    actor: hecs::Entity,
    kind: u16,
    amount: u16,
) -> Result<u16, Refusal> {
    let req = hold_request(cx, id, actor, 0).ok_or(Refusal::NotAboard)?;
    check_hold(&req).map_err(hold_denial_to_refusal)?;

    let vessel = cx.zone.vessels.get_mut(id).expect("checked");
    let Some(index) = vessel.hold.contents.iter().position(|s| s.kind == kind) else {
        return Ok(0);
    };
    let slot = &mut vessel.hold.contents[index];
    let taken = slot.amount.min(amount);
    slot.amount -= taken;
    if slot.amount == 0 {
        vessel.hold.contents.remove(index);
    }
    Ok(taken)
}

/// Drop a chart artifact on the helm, assigning it as the vessel's waypoint
/// source. Resets the course to the first leg.
pub fn assign_chart(cx: &mut Ctx, id: VesselId, chart: hecs::Entity) -> Result<(), Refusal> {
    if cx.zone.objects.get::<&Chart>(chart).is_err() {
        return Err(Refusal::NoChart);
    }
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Err(Refusal::NotAboard);
    };
    vessel.nav = Some(crate::vessel::Course {
        chart: chart.to_bits().get(),
        next_leg: 0,
        single_leg: false,
    });
    Ok(())
}
