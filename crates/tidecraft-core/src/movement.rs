//! The movement controller — translation ticks, turns, anchoring, and the
//! soft-obstruction (sinkable) interaction.
//!
//! All mutation happens inside scheduled task callbacks on the simulation
//! thread. Every handler re-checks liveness at the top: the vessel must still
//! exist and must still consider the firing task its live one; otherwise the
//! entry is stale and dropped. Fit is validated before any mutation, so a
//! refused step or turn never commits a partial transform.

use tidecraft_logic::constants::{gait, TURN_DELAY};
use tidecraft_logic::grid::{rotate_offset, wrap_into, CellPos, Heading};
use tidecraft_logic::messages::{self, Refusal};

use crate::collision::{can_fit, Fit, Probe};
use crate::components::{Body, Position};
use crate::events::{Audience, Cue};
use crate::scheduler::{Task, TaskId, Tick};
use crate::vessel::{MovementState, Underway, Vessel, VesselId};
use crate::world::{Ctx, Zone};

/// Fast or slow sailing; each pairs a per-tick speed with a task interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitKind {
    Fast,
    Slow,
}

impl GaitKind {
    pub fn speed(self) -> u8 {
        match self {
            GaitKind::Fast => gait::FAST_SPEED,
            GaitKind::Slow => gait::SLOW_SPEED,
        }
    }

    /// Drift headings tick slower than fore-and-aft travel.
    pub fn interval(self, heading: Heading) -> Tick {
        let base = match self {
            GaitKind::Fast => gait::FAST_INTERVAL,
            GaitKind::Slow => gait::SLOW_INTERVAL,
        };
        if heading.is_drift() {
            base + gait::DRIFT_PENALTY
        } else {
            base
        }
    }
}

/// Begin moving along a heading. One-shot requests advance a single cell and
/// stop. Supersedes any scheduled movement or turn.
pub fn start_moving(
    cx: &mut Ctx,
    id: VesselId,
    heading: Heading,
    kind: GaitKind,
    one_shot: bool,
) -> Result<(), Refusal> {
    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Ok(());
    };
    if vessel.is_decaying() {
        return Err(Refusal::Foundering);
    }
    if vessel.anchored {
        return Err(Refusal::Anchored);
    }
    let speed = if one_shot { 1 } else { kind.speed() };
    let interval = kind.interval(heading);
    vessel.state = MovementState::Moving(Underway {
        heading,
        speed,
        one_shot,
        interval,
    });
    vessel.turn_task = None;
    vessel.nav_task = None;
    vessel.move_task = Some(cx.scheduler.schedule(now + interval, id, Task::MoveTick));
    Ok(())
}

/// Cancel any movement or course and report the stop to the deck.
pub fn stop_moving(cx: &mut Ctx, id: VesselId) {
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return;
    };
    if matches!(vessel.state, MovementState::Moving(_)) || vessel.nav_task.is_some() {
        halt(vessel);
        cx.outbox
            .line(Audience::Deck(id), messages::LINE_STOPPED);
    }
}

/// Drop the anchor. Idempotent with feedback; cancels movement first.
pub fn lower_anchor(cx: &mut Ctx, id: VesselId) -> Result<(), Refusal> {
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Ok(());
    };
    if vessel.is_decaying() {
        return Err(Refusal::Foundering);
    }
    if vessel.anchored {
        return Err(Refusal::AlreadyAnchored);
    }
    halt(vessel);
    if matches!(vessel.state, MovementState::Turning { .. }) {
        vessel.state = MovementState::Idle;
        vessel.turn_task = None;
    }
    vessel.anchored = true;
    cx.outbox
        .line(Audience::Deck(id), messages::LINE_ANCHOR_DOWN);
    Ok(())
}

/// Weigh the anchor. Idempotent with feedback.
pub fn raise_anchor(cx: &mut Ctx, id: VesselId) -> Result<(), Refusal> {
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Ok(());
    };
    if vessel.is_decaying() {
        return Err(Refusal::Foundering);
    }
    if !vessel.anchored {
        return Err(Refusal::AnchorAlreadyRaised);
    }
    vessel.anchored = false;
    cx.outbox.line(Audience::Deck(id), messages::LINE_ANCHOR_UP);
    Ok(())
}

/// Stationary without touching the anchor; clears movement tasks.
pub(crate) fn halt(vessel: &mut Vessel) {
    if matches!(vessel.state, MovementState::Moving(_)) {
        vessel.state = MovementState::Idle;
    }
    vessel.move_task = None;
    vessel.nav_task = None;
}

/// One attempted single-cell step.
pub(crate) enum StepOutcome {
    Moved,
    /// The crew refuses to enter a forbidden rectangle.
    Forbidden,
    /// Terrain, statics, another hull, or a solid object.
    Hard,
    /// Only sinkable obstructions in the way.
    Soft(Vec<hecs::Entity>),
}

/// Attempt one step of `(dx, dy)`, committing the translation on success.
pub(crate) fn try_step(cx: &mut Ctx, id: VesselId, dx: i32, dy: i32) -> StepOutcome {
    let (probe, target, entering_forbidden) = {
        let vessel = cx.zone.vessels.get(id).expect("liveness checked by caller");
        let plan = vessel.plan();
        let mut tx = vessel.origin.x + dx;
        let mut ty = vessel.origin.y + dy;

        // Edge wrap: if the candidate footprint would cross the active-zone
        // rectangle, teleport to the opposite edge instead of sailing off.
        if let Some(wrap) = &cx.zone.wrap {
            if wrap.contains_cell(vessel.origin) {
                let rect = plan.bounding_rect(CellPos::new(tx, ty, vessel.origin.z), vessel.facing);
                let off_w = tx - rect.x1;
                let off_e = rect.x2 - tx;
                let off_n = ty - rect.y1;
                let off_s = rect.y2 - ty;
                if rect.x1 < wrap.x1 {
                    tx = wrap.x2 - off_e;
                } else if rect.x2 > wrap.x2 {
                    tx = wrap.x1 + off_w;
                }
                if rect.y1 < wrap.y1 {
                    ty = wrap.y2 - off_s;
                } else if rect.y2 > wrap.y2 {
                    ty = wrap.y1 + off_n;
                }
                // Origin-only drift past the rectangle (no footprint crossing)
                // still wraps per axis.
                (tx, ty) = wrap_into(wrap, tx, ty);
            }
        }

        let target = CellPos::new(tx, ty, vessel.origin.z);
        let candidate_rect = plan.bounding_rect(target, vessel.facing);
        let current_rect = plan.bounding_rect(vessel.origin, vessel.facing);
        let entering = cx
            .zone
            .forbidden
            .iter()
            .any(|f| f.intersects(&candidate_rect) && !f.intersects(&current_rect));
        (Probe::step(vessel, target), target, entering)
    };

    if entering_forbidden {
        return StepOutcome::Forbidden;
    }

    match can_fit(cx.zone, &probe) {
        Fit::Clear => {
            commit_translation(cx, id, target);
            StepOutcome::Moved
        }
        Fit::SoftBlocked { sinkables } => StepOutcome::Soft(sinkables),
        Fit::Blocked(_) => StepOutcome::Hard,
    }
}

/// Recurring movement tick: up to `speed` steps, truncated at the first
/// failure. A failure on the very first step stops the vessel, runs the
/// sinkable side-effect, and reports the stop.
pub fn move_tick(cx: &mut Ctx, id: VesselId, task: TaskId) {
    let (heading, speed, one_shot, interval) = {
        let Some(vessel) = cx.zone.vessels.get(id) else {
            return;
        };
        if vessel.move_task != Some(task) {
            return; // superseded
        }
        let MovementState::Moving(u) = vessel.state else {
            return;
        };
        (u.heading, u.speed, u.one_shot, u.interval)
    };
    let facing = cx.zone.vessels.get(id).expect("checked").facing;
    let (dx, dy) = heading.world_vector(facing);

    for step in 0..speed {
        match try_step(cx, id, dx, dy) {
            StepOutcome::Moved => {}
            StepOutcome::Forbidden => {
                if step == 0 {
                    cx.outbox.line(
                        Audience::Deck(id),
                        messages::refusal_line(Refusal::ForbiddenWaters),
                    );
                    stop_here(cx, id);
                    return;
                }
                break;
            }
            StepOutcome::Hard => {
                if step == 0 {
                    cx.outbox.line(Audience::Deck(id), messages::LINE_STOPPED);
                    stop_here(cx, id);
                    return;
                }
                break;
            }
            StepOutcome::Soft(hits) => {
                if step == 0 {
                    sinkable_contact(cx, id, hits);
                    cx.outbox.line(Audience::Deck(id), messages::LINE_STOPPED);
                    stop_here(cx, id);
                    return;
                }
                break;
            }
        }
    }

    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return;
    };
    if one_shot {
        vessel.state = MovementState::Idle;
        vessel.move_task = None;
    } else {
        vessel.move_task = Some(cx.scheduler.schedule(now + interval, id, Task::MoveTick));
    }
}

fn stop_here(cx: &mut Ctx, id: VesselId) {
    if let Some(vessel) = cx.zone.vessels.get_mut(id) {
        halt(vessel);
    }
}

/// Two-strike soft-obstruction rule: the first contact with an obstruction
/// set is a bump cue only; repeated contact pushes every collected sinkable
/// one z step under, up to the per-object limit.
pub(crate) fn sinkable_contact(cx: &mut Ctx, id: VesselId, hits: Vec<hecs::Entity>) {
    let bits: Vec<u64> = hits.iter().map(|e| e.to_bits().get()).collect();
    let repeat = {
        let Some(vessel) = cx.zone.vessels.get_mut(id) else {
            return;
        };
        let repeat = vessel.graze.iter().any(|g| bits.contains(g));
        vessel.graze = bits;
        repeat
    };

    if !repeat {
        let cell = hits
            .first()
            .and_then(|e| cx.zone.objects.get::<&Position>(*e).ok().map(|p| p.cell));
        if let Some(cell) = cell {
            cx.outbox.cue(cell, Cue::Bump);
        }
        return;
    }

    for entity in hits {
        if let Ok((pos, body)) = cx
            .zone
            .objects
            .query_one_mut::<(&mut Position, &mut Body)>(entity)
        {
            if body.sunk_steps < tidecraft_logic::constants::sink::STEP_LIMIT {
                pos.cell.z -= tidecraft_logic::constants::sink::STEP;
                body.sunk_steps += 1;
                let cell = pos.cell;
                cx.outbox.cue(cell, Cue::Splash);
            }
        }
    }
}

/// Translate the hull and everything aboard by the same delta, then restack
/// designated projectile kinds at their new cells.
fn commit_translation(cx: &mut Ctx, id: VesselId, target: CellPos) {
    let zone = &mut *cx.zone;
    let (old_origin, plan, facing) = {
        let vessel = zone.vessels.get(id).expect("liveness checked by caller");
        (vessel.origin, vessel.plan(), vessel.facing)
    };
    let ddx = target.x - old_origin.x;
    let ddy = target.y - old_origin.y;

    // Everything riding the deck moves; objects already pushed under the
    // hull (sunk corpses) stay where they sank.
    let aboard: Vec<(hecs::Entity, CellPos)> = zone
        .objects
        .query::<&Position>()
        .iter()
        .filter(|(_, p)| {
            p.cell.z >= old_origin.z
                && plan.covers(facing, p.cell.x - old_origin.x, p.cell.y - old_origin.y)
        })
        .map(|(e, p)| (e, p.cell))
        .collect();
    for (entity, cell) in &aboard {
        if let Ok(pos) = zone.objects.query_one_mut::<&mut Position>(*entity) {
            pos.cell = cell.shifted(ddx, ddy);
        }
    }

    {
        let vessel = zone.vessels.get_mut(id).expect("liveness checked by caller");
        vessel.origin = target;
        vessel.graze.clear();
    }

    restack_projectiles(zone, &aboard);
    crate::decay::reset_deadline(cx, id);
    log::debug!("{} stepped to {:?}", id, target);
}

/// Housekeeping after relocation: merge identical stacks of the designated
/// projectile kinds that now share a cell.
fn restack_projectiles(zone: &mut Zone, relocated: &[(hecs::Entity, CellPos)]) {
    use std::collections::HashMap;

    let mut keepers: HashMap<(i32, i32, u16), hecs::Entity> = HashMap::new();
    let mut merges: Vec<(hecs::Entity, hecs::Entity)> = Vec::new();

    for (entity, _) in relocated {
        let Ok((pos, body)) = zone
            .objects
            .query_one_mut::<(&Position, &Body)>(*entity)
        else {
            continue;
        };
        if !zone.classify.is_restacked(body.kind) {
            continue;
        }
        let slot = (pos.cell.x, pos.cell.y, body.kind);
        match keepers.get(&slot) {
            Some(keeper) => merges.push((*keeper, *entity)),
            None => {
                keepers.insert(slot, *entity);
            }
        }
    }

    for (keeper, dup) in merges {
        let amount = zone
            .objects
            .get::<&Body>(dup)
            .map(|b| b.amount)
            .unwrap_or(0);
        if let Ok(body) = zone.objects.query_one_mut::<&mut Body>(keeper) {
            body.amount = body.amount.saturating_add(amount);
        }
        let _ = zone.objects.despawn(dup);
    }
}

/// Schedule a turn by a signed quarter-turn count. The facing change commits
/// after a short delay, once the new footprint is validated.
pub fn begin_turn(cx: &mut Ctx, id: VesselId, quarters: i8) -> Result<(), Refusal> {
    let now = cx.now;
    let Some(vessel) = cx.zone.vessels.get_mut(id) else {
        return Ok(());
    };
    if vessel.is_decaying() {
        return Err(Refusal::Foundering);
    }
    if vessel.anchored {
        return Err(Refusal::Anchored);
    }
    vessel.state = MovementState::Turning { quarters };
    vessel.move_task = None;
    vessel.turn_task = Some(cx.scheduler.schedule(now + TURN_DELAY, id, Task::TurnCommit));
    Ok(())
}

/// One-shot turn commit: revalidate fit at the new facing, then rotate the
/// hull and everything aboard around the origin; refuse without touching
/// state otherwise.
pub fn turn_commit(cx: &mut Ctx, id: VesselId, task: TaskId) {
    let (quarters, new_facing) = {
        let Some(vessel) = cx.zone.vessels.get(id) else {
            return;
        };
        if vessel.turn_task != Some(task) {
            return;
        }
        let MovementState::Turning { quarters } = vessel.state else {
            return;
        };
        (quarters, vessel.facing.rotated(quarters))
    };

    let fit = {
        let vessel = cx.zone.vessels.get(id).expect("checked");
        can_fit(cx.zone, &Probe::turn(vessel, new_facing))
    };

    if !fit.is_clear() {
        let vessel = cx.zone.vessels.get_mut(id).expect("checked");
        vessel.state = MovementState::Idle;
        vessel.turn_task = None;
        cx.outbox.line(
            Audience::Deck(id),
            messages::refusal_line(Refusal::CannotTurn),
        );
        return;
    }

    let zone = &mut *cx.zone;
    let (origin, plan, old_facing) = {
        let vessel = zone.vessels.get(id).expect("checked");
        (vessel.origin, vessel.plan(), vessel.facing)
    };

    let aboard: Vec<(hecs::Entity, CellPos)> = zone
        .objects
        .query::<&Position>()
        .iter()
        .filter(|(_, p)| {
            p.cell.z >= origin.z
                && plan.covers(old_facing, p.cell.x - origin.x, p.cell.y - origin.y)
        })
        .map(|(e, p)| (e, p.cell))
        .collect();
    for (entity, cell) in aboard {
        let (rx, ry) = rotate_offset(cell.x - origin.x, cell.y - origin.y, quarters);
        if let Ok(pos) = zone.objects.query_one_mut::<&mut Position>(entity) {
            pos.cell = CellPos::new(origin.x + rx, origin.y + ry, cell.z);
        }
    }

    let vessel = zone.vessels.get_mut(id).expect("checked");
    vessel.facing = new_facing;
    vessel.state = MovementState::Idle;
    vessel.turn_task = None;
    log::debug!("{} came about to {:?}", id, new_facing);
}
