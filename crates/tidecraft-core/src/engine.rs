//! Simulation engine — owns the zone, the scheduler, the clock, and the
//! event outbox, and dispatches due tasks each tick.

use std::io::{Read, Write};

use tidecraft_logic::footprint::HullClass;
use tidecraft_logic::grid::{CellPos, Facing};
use tidecraft_logic::messages::Refusal;

use crate::commands::{self, HelmOrder};
use crate::events::Outbox;
use crate::persistence::{self, SaveError};
use crate::scheduler::{Scheduler, Task, Tick};
use crate::vessel::{self, DeedToken, PlacementError, PlankSide, VesselId};
use crate::world::{Ctx, Zone};
use crate::{decay, fixtures, movement, navigation};

/// The simulation engine for one zone.
pub struct Engine {
    pub zone: Zone,
    pub scheduler: Scheduler,
    pub outbox: Outbox,
    now: Tick,
}

impl Engine {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            scheduler: Scheduler::new(),
            outbox: Outbox::new(),
            now: 0,
        }
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            zone: &mut self.zone,
            scheduler: &mut self.scheduler,
            outbox: &mut self.outbox,
            now: self.now,
        }
    }

    /// Advance the clock, dispatching every task as it comes due. A command
    /// issued between calls runs before the next tick's tasks, never in the
    /// middle of one.
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.now += 1;
            loop {
                let Some(entry) = self.scheduler.pop_due(self.now) else {
                    break;
                };
                let mut cx = Ctx {
                    zone: &mut self.zone,
                    scheduler: &mut self.scheduler,
                    outbox: &mut self.outbox,
                    now: self.now,
                };
                match entry.task {
                    Task::MoveTick => movement::move_tick(&mut cx, entry.vessel, entry.id),
                    Task::TurnCommit => movement::turn_commit(&mut cx, entry.vessel, entry.id),
                    Task::NavTick => navigation::nav_tick(&mut cx, entry.vessel, entry.id),
                    Task::PlankClose(side) => {
                        fixtures::plank_close(&mut cx, entry.vessel, side, entry.id)
                    }
                    Task::DecayDue => decay::decay_due(&mut cx, entry.vessel, entry.id),
                    Task::DecayStage => decay::decay_stage(&mut cx, entry.vessel, entry.id),
                }
            }
        }
    }

    /// Place a vessel from a deed token.
    pub fn place(
        &mut self,
        token: DeedToken,
        origin: CellPos,
        facing: Facing,
        owner: Option<u64>,
    ) -> Result<VesselId, PlacementError> {
        vessel::place_vessel(&mut self.ctx(), token, origin, facing, owner)
    }

    /// Place a vessel of the given class; convenience for hosts that mint
    /// tokens on the fly.
    pub fn place_class(
        &mut self,
        class: HullClass,
        origin: CellPos,
        facing: Facing,
        owner: Option<u64>,
    ) -> Result<VesselId, PlacementError> {
        self.place(DeedToken { class }, origin, facing, owner)
    }

    /// Dry-dock a vessel back into a token.
    pub fn dry_dock(&mut self, id: VesselId) -> Result<DeedToken, Refusal> {
        vessel::dry_dock(&mut self.ctx(), id)
    }

    /// Feed one already-parsed helm order into the simulation.
    pub fn command(&mut self, id: VesselId, actor: hecs::Entity, order: HelmOrder) {
        commands::helm_order(&mut self.ctx(), id, actor, order);
    }

    pub fn toggle_plank(
        &mut self,
        id: VesselId,
        side: PlankSide,
        actor: hecs::Entity,
    ) -> Result<(), Refusal> {
        fixtures::toggle_plank(&mut self.ctx(), id, side, actor)
    }

    pub fn stow(
        &mut self,
        id: VesselId,
        actor: hecs::Entity,
        kind: u16,
        amount: u16,
    ) -> Result<(), Refusal> {
        fixtures::stow(&mut self.ctx(), id, actor, kind, amount)
    }

    pub fn withdraw(
        &mut self,
        id: VesselId,
        actor: hecs::Entity,
        kind: u16,
        amount: u16,
    ) -> Result<u16, Refusal> {
        fixtures::withdraw(&mut self.ctx(), id, actor, kind, amount)
    }

    pub fn assign_chart(&mut self, id: VesselId, chart: hecs::Entity) -> Result<(), Refusal> {
        fixtures::assign_chart(&mut self.ctx(), id, chart)
    }

    /// Refresh a vessel's decay deadline; staff refreshes can cancel a
    /// running countdown.
    pub fn refresh(&mut self, id: VesselId, staff: bool) -> bool {
        decay::refresh(&mut self.ctx(), id, staff)
    }

    /// Save every vessel in the zone.
    pub fn save<W: Write>(&mut self, writer: W) -> Result<(), SaveError> {
        persistence::save_fleet(&self.ctx(), writer)
    }

    /// Load a fleet snapshot into the zone.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<usize, SaveError> {
        let records = persistence::load_fleet(reader)?;
        let count = records.len();
        persistence::restore_fleet(&mut self.ctx(), records);
        Ok(count)
    }
}
