//! End-to-end voyages through the engine: placement, commands, collisions,
//! sinkables, decay, navigation, and persistence.

use tidecraft_core::commands::HelmOrder;
use tidecraft_core::components::{Body, Carried, Chart, Inventory, Mobile, Position};
use tidecraft_core::engine::Engine;
use tidecraft_core::events::SimEvent;
use tidecraft_core::movement::GaitKind;
use tidecraft_core::scheduler::Task;
use tidecraft_core::vessel::{MovementState, PlankSide, VesselId};
use tidecraft_core::world::{GridMap, StaticTile, TerrainTile, Zone};

use tidecraft_logic::classify::{ids, Classification};
use tidecraft_logic::constants::{decay, gait, PLANK_CLOSE_DELAY};
use tidecraft_logic::footprint::{Fixture, HullClass};
use tidecraft_logic::grid::{CellPos, Facing, Heading, Rect};

fn open_sea_map() -> GridMap {
    GridMap::filled(
        0,
        Rect::new(0, 0, 199, 199),
        TerrainTile {
            id: ids::TERRAIN_OPEN_WATER,
            z: 0,
        },
    )
}

fn engine_with(map: GridMap) -> Engine {
    Engine::new(Zone::new(Box::new(map), Classification::default_sea()))
}

fn open_sea_engine() -> Engine {
    engine_with(open_sea_map())
}

/// Place a small vessel and board a keyed helmsman at the helm cell.
fn crewed_vessel(engine: &mut Engine) -> (VesselId, hecs::Entity) {
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    let key = engine.zone.vessels.get(id).unwrap().key;
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let actor = engine.zone.objects.spawn((
        Position::at(helm),
        Mobile::named("Helmsman"),
        Inventory::with(vec![Carried::Key(key)]),
    ));
    (id, actor)
}

fn vessel_origin(engine: &Engine, id: VesselId) -> CellPos {
    engine.zone.vessels.get(id).unwrap().origin
}

// --- Movement scenarios ---

#[test]
fn full_sail_forward_advances_three_cells() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 97, 0));
    assert!(matches!(
        engine.zone.vessels.get(id).unwrap().state,
        MovementState::Moving(_)
    ));
}

#[test]
fn crew_rides_the_hull() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let before = engine.zone.objects.get::<&Position>(actor).unwrap().cell;
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    let after = engine.zone.objects.get::<&Position>(actor).unwrap().cell;
    assert_eq!((after.x, after.y), (before.x, before.y - 3));
}

#[test]
fn blocked_first_step_stops_with_feedback() {
    let mut map = open_sea_map();
    // The first step's newly entered row for a small hull at (100,100)
    // facing north is y=96.
    map.add_static(
        100,
        96,
        StaticTile {
            id: ids::KIND_REEF_SPUR,
            z: 0,
            height: 2,
        },
    );
    let mut engine = engine_with(map);
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 100, 0));
    assert!(engine.outbox.contains_line("We've stopped."));
    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.state, MovementState::Idle);
    assert!(vessel.move_task.is_none());
}

#[test]
fn multi_step_move_truncates_at_first_failure() {
    let mut map = open_sea_map();
    // Clear at y=96 (step 1), blocked at y=95 (step 2): advance exactly one.
    map.add_static(
        100,
        95,
        StaticTile {
            id: ids::KIND_REEF_SPUR,
            z: 0,
            height: 2,
        },
    );
    let mut engine = engine_with(map);
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 99, 0));
    // Still moving: only a first-step failure stops the vessel.
    assert!(matches!(
        engine.zone.vessels.get(id).unwrap().state,
        MovementState::Moving(_)
    ));
}

#[test]
fn single_step_order_moves_one_cell_and_rests() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Step {
            heading: Heading::Backward,
        },
    );
    engine.advance(gait::SLOW_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 101, 0));
    assert_eq!(
        engine.zone.vessels.get(id).unwrap().state,
        MovementState::Idle
    );
}

#[test]
fn moving_while_anchored_is_refused() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 100, 0));
    assert!(engine.outbox.contains_line("anchor is down"));
}

#[test]
fn anchoring_is_idempotent_with_feedback() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    // Placed anchored: the first lower is the refusal.
    engine.command(id, actor, HelmOrder::LowerAnchor);
    assert!(engine.outbox.contains_line("already down"));

    engine.command(id, actor, HelmOrder::RaiseAnchor);
    assert!(!engine.zone.vessels.get(id).unwrap().anchored);

    engine.outbox.drain();
    engine.command(id, actor, HelmOrder::LowerAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored);
    assert!(engine.outbox.contains_line("Anchor lowered."));

    engine.outbox.drain();
    engine.command(id, actor, HelmOrder::LowerAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored);
    assert!(engine.outbox.contains_line("already down"));
}

#[test]
fn forbidden_rectangle_vetoes_entry() {
    let mut engine = open_sea_engine();
    engine.zone.forbidden.push(Rect::new(90, 90, 110, 96));
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 100, 0));
    assert!(engine.outbox.contains_line("refuses to sail"));
}

#[test]
fn edge_wrap_teleports_to_opposite_side() {
    let mut engine = open_sea_engine();
    engine.zone.wrap = Some(Rect::new(0, 0, 199, 199));
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 3, 0), Facing::North, None)
        .unwrap();
    let key = engine.zone.vessels.get(id).unwrap().key;
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let actor = engine.zone.objects.spawn((
        Position::at(helm),
        Mobile::named("Helmsman"),
        Inventory::with(vec![Carried::Key(key)]),
    ));
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Step {
            heading: Heading::Forward,
        },
    );
    engine.advance(gait::SLOW_INTERVAL);

    // The bow would cross y=0; the hull re-enters at the south edge.
    let origin = vessel_origin(&engine, id);
    assert_eq!(origin.x, 100);
    assert_eq!(origin.y, 196);
    // The helmsman wrapped with it.
    let cell = engine.zone.objects.get::<&Position>(actor).unwrap().cell;
    assert!(engine.zone.vessels.get(id).unwrap().contains(cell));
}

// --- Turning ---

#[test]
fn turn_rotates_hull_and_everything_aboard() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let crate_cell = CellPos::new(100, 98, 0);
    let cargo = engine
        .zone
        .objects
        .spawn((Position::at(crate_cell), Body::new(ids::KIND_CRATE)));

    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(id, actor, HelmOrder::TurnRight);
    engine.advance(tidecraft_logic::constants::TURN_DELAY);

    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.facing, Facing::East);
    assert_eq!(vessel.state, MovementState::Idle);
    // (0,-2) relative rotates to (2,0).
    let cell = engine.zone.objects.get::<&Position>(cargo).unwrap().cell;
    assert_eq!((cell.x, cell.y), (102, 100));
    // Fixtures follow the facing.
    assert_eq!(
        engine.zone.vessels.get(id).unwrap().helm_cell(),
        CellPos::new(97, 100, 0)
    );
}

#[test]
fn blocked_turn_reports_and_keeps_facing() {
    let mut map = open_sea_map();
    // East footprint spans x 97..=103, y 99..=101; block a cell the north
    // footprint does not cover.
    map.add_static(
        97,
        101,
        StaticTile {
            id: ids::KIND_REEF_SPUR,
            z: 0,
            height: 2,
        },
    );
    let mut engine = engine_with(map);
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(id, actor, HelmOrder::TurnRight);
    engine.advance(tidecraft_logic::constants::TURN_DELAY);

    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.facing, Facing::North);
    assert_eq!(vessel.state, MovementState::Idle);
    assert!(engine.outbox.contains_line("can't turn"));
}

#[test]
fn four_turns_return_everything_exactly() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let cargo = engine.zone.objects.spawn((
        Position::at(CellPos::new(99, 102, 0)),
        Body::new(ids::KIND_CRATE),
    ));
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    for _ in 0..4 {
        engine.command(id, actor, HelmOrder::TurnLeft);
        engine.advance(tidecraft_logic::constants::TURN_DELAY);
    }
    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.facing, Facing::North);
    let cell = engine.zone.objects.get::<&Position>(cargo).unwrap().cell;
    assert_eq!((cell.x, cell.y), (99, 102));
}

#[test]
fn turning_while_anchored_is_refused() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::TurnLeft);
    engine.advance(tidecraft_logic::constants::TURN_DELAY);
    assert_eq!(engine.zone.vessels.get(id).unwrap().facing, Facing::North);
    assert!(engine.outbox.contains_line("anchor is down"));
}

// --- Sinkables ---

#[test]
fn sinkable_two_strike_rule() {
    let mut engine = open_sea_engine();
    let corpse = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 96, 0)),
        Body::new(ids::KIND_CORPSE),
    ));
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);

    // First attempt: bump only, nothing moves.
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);
    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 100, 0));
    assert_eq!(
        engine.zone.objects.get::<&Position>(corpse).unwrap().cell.z,
        0
    );

    // Second attempt against the same obstruction: it sinks one step.
    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);
    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 100, 0));
    assert_eq!(
        engine.zone.objects.get::<&Position>(corpse).unwrap().cell.z,
        -1
    );
    assert_eq!(
        engine.zone.objects.get::<&Body>(corpse).unwrap().sunk_steps,
        1
    );
}

#[test]
fn fully_sunk_corpse_stops_obstructing() {
    let mut engine = open_sea_engine();
    let corpse = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 96, 0)),
        Body::new(ids::KIND_CORPSE),
    ));
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);

    // Bump once, then sink three times (corpse clearance).
    for _ in 0..4 {
        engine.command(
            id,
            actor,
            HelmOrder::Start {
                heading: Heading::Forward,
                gait: GaitKind::Fast,
            },
        );
        engine.advance(gait::FAST_INTERVAL);
    }
    assert_eq!(
        engine.zone.objects.get::<&Position>(corpse).unwrap().cell.z,
        -3
    );

    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);
    assert_eq!(vessel_origin(&engine, id), CellPos::new(100, 97, 0));
}

// --- Projectile restacking ---

#[test]
fn arrows_on_deck_merge_after_a_step() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    // Two arrow stacks that will land on the same cell after the step: they
    // start on the same cell already (dropped together), plus one elsewhere.
    let a = engine.zone.objects.spawn((
        Position::at(CellPos::new(99, 99, 0)),
        Body::new(ids::KIND_ARROW).with_amount(5),
    ));
    let b = engine.zone.objects.spawn((
        Position::at(CellPos::new(99, 99, 0)),
        Body::new(ids::KIND_ARROW).with_amount(7),
    ));
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Step {
            heading: Heading::Forward,
        },
    );
    engine.advance(gait::SLOW_INTERVAL);

    let survivors: Vec<u16> = [a, b]
        .iter()
        .filter_map(|e| engine.zone.objects.get::<&Body>(*e).ok().map(|b| b.amount))
        .collect();
    assert_eq!(survivors.len(), 1, "identical stacks merged");
    assert_eq!(survivors[0], 12);
}

// --- Access control ---

#[test]
fn keyless_nearest_occupant_commands_when_no_key_aboard() {
    let mut engine = open_sea_engine();
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let near = engine.zone.objects.spawn((
        Position::at(helm),
        Mobile::named("Bosun"),
    ));
    let far = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 98, 0)),
        Mobile::named("Deckhand"),
    ));

    engine.command(id, far, HelmOrder::RaiseAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored, "far hand refused");

    engine.command(id, near, HelmOrder::RaiseAnchor);
    assert!(!engine.zone.vessels.get(id).unwrap().anchored, "near hand obeyed");
}

#[test]
fn key_holder_outranks_proximity() {
    let mut engine = open_sea_engine();
    let (id, _helmsman) = crewed_vessel(&mut engine);
    // A keyless actor even closer to the helm than the key holder.
    let rival = engine.zone.objects.spawn((
        Position::at(engine.zone.vessels.get(id).unwrap().helm_cell()),
        Mobile::named("Stowaway"),
    ));
    engine.command(id, rival, HelmOrder::RaiseAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored);
}

#[test]
fn distance_tie_authorizes_nobody() {
    let mut engine = open_sea_engine();
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    // Helm is at (100,103); these two tie at distance 1.
    let left = engine.zone.objects.spawn((
        Position::at(CellPos::new(99, 103, 0)),
        Mobile::named("Port hand"),
    ));
    let right = engine.zone.objects.spawn((
        Position::at(CellPos::new(101, 103, 0)),
        Mobile::named("Starboard hand"),
    ));
    engine.command(id, left, HelmOrder::RaiseAnchor);
    engine.command(id, right, HelmOrder::RaiseAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored);
}

#[test]
fn jammed_deck_refuses_even_the_key_holder() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    // A crate on a helm-adjacent deck cell.
    engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 102, 0)),
        Body::new(ids::KIND_CRATE),
    ));
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    assert!(engine.zone.vessels.get(id).unwrap().anchored);
    assert!(engine.outbox.contains_line("Clear the deck"));
}

#[test]
fn staff_bypass_jam() {
    let mut engine = open_sea_engine();
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 102, 0)),
        Body::new(ids::KIND_CRATE),
    ));
    let staff = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 101, 0)),
        Mobile::staff("Harbormaster"),
    ));
    engine.command(id, staff, HelmOrder::RaiseAnchor);
    assert!(!engine.zone.vessels.get(id).unwrap().anchored);
}

#[test]
fn dead_holders_key_counts_under_salvage_rules() {
    let mut engine = open_sea_engine();
    engine.zone.rules.honor_dead_holders = true;
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    let key = engine.zone.vessels.get(id).unwrap().key;
    // A keyless survivor far from the helm, and a rival nearer to it.
    let survivor = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 98, 0)),
        Mobile::named("Survivor"),
    ));
    let _rival = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 103, 0)),
        Mobile::named("Rival"),
    ));
    // The survivor's remains, aboard, with the key inside.
    let survivor_bits = survivor.to_bits().get();
    engine.zone.objects.spawn((
        Position::at(CellPos::new(99, 100, 0)),
        Body::new(ids::KIND_CORPSE),
        tidecraft_core::components::Remains { of: survivor_bits },
        Inventory::with(vec![Carried::Key(key)]),
    ));

    engine.command(id, survivor, HelmOrder::RaiseAnchor);
    assert!(!engine.zone.vessels.get(id).unwrap().anchored);
}

// --- Planks and hold ---

#[test]
fn plank_auto_closes_when_cell_clears() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.toggle_plank(id, PlankSide::Port, actor).unwrap();
    assert!(engine.zone.vessels.get(id).unwrap().plank(PlankSide::Port).open);

    // Something standing on the plank keeps it open.
    let plank_cell = engine
        .zone
        .vessels
        .get(id)
        .unwrap()
        .fixture_cell(Fixture::PortPlank);
    let lubber = engine
        .zone
        .objects
        .spawn((Position::at(plank_cell), Mobile::named("Lubber")));
    engine.advance(PLANK_CLOSE_DELAY);
    assert!(engine.zone.vessels.get(id).unwrap().plank(PlankSide::Port).open);

    engine.zone.objects.despawn(lubber).unwrap();
    engine.advance(PLANK_CLOSE_DELAY);
    assert!(!engine.zone.vessels.get(id).unwrap().plank(PlankSide::Port).open);
}

#[test]
fn plank_needs_the_key() {
    let mut engine = open_sea_engine();
    let id = engine
        .place_class(HullClass::Small, CellPos::new(100, 100, 0), Facing::North, None)
        .unwrap();
    let keyless = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 101, 0)),
        Mobile::named("Passenger"),
    ));
    assert!(engine.toggle_plank(id, PlankSide::Port, keyless).is_err());
}

#[test]
fn hold_refuses_service_underway() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.stow(id, actor, ids::KIND_CRATE, 2).unwrap();

    engine.command(
        id,
        actor,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Slow,
        },
    );
    let denied = engine.stow(id, actor, ids::KIND_CRATE, 1);
    assert!(denied.is_err());

    engine.command(id, actor, HelmOrder::Stop);
    engine.stow(id, actor, ids::KIND_CRATE, 1).unwrap();
    assert_eq!(engine.zone.vessels.get(id).unwrap().hold.stored(), 3);
}

#[test]
fn dry_dock_refuses_a_laden_hold() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.stow(id, actor, ids::KIND_CRATE, 2).unwrap();
    assert!(engine.dry_dock(id).is_err());

    assert_eq!(engine.withdraw(id, actor, ids::KIND_CRATE, 5).unwrap(), 2);
    let token = engine.dry_dock(id).unwrap();
    assert_eq!(token.class, HullClass::Small);
    assert!(engine.zone.vessels.get(id).is_none());
}

// --- Decay ---

#[test]
fn placement_sets_the_decay_deadline() {
    let mut engine = open_sea_engine();
    let (id, _) = crewed_vessel(&mut engine);
    assert_eq!(
        engine.zone.vessels.get(id).unwrap().decay_deadline,
        engine.now() + decay::TIMEOUT
    );
}

#[test]
fn successful_translation_resets_the_deadline() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        actor,
        HelmOrder::Step {
            heading: Heading::Forward,
        },
    );
    engine.advance(gait::SLOW_INTERVAL);
    assert_eq!(
        engine.zone.vessels.get(id).unwrap().decay_deadline,
        engine.now() + decay::TIMEOUT
    );
}

/// Pull a vessel's deadline close so the countdown is reachable in a test.
fn hasten_decay(engine: &mut Engine, id: VesselId, in_ticks: u64) {
    let due = engine.now() + in_ticks;
    let task = engine.scheduler.schedule(due, id, Task::DecayDue);
    let vessel = engine.zone.vessels.get_mut(id).unwrap();
    vessel.decay_deadline = due;
    vessel.decay_task = Some(task);
}

#[test]
fn abandoned_vessel_founders_in_stages() {
    let mut engine = open_sea_engine();
    let (id, _) = crewed_vessel(&mut engine);
    hasten_decay(&mut engine, id, 3);
    engine.advance(3 + decay::STAGES as u64 * decay::STAGE_INTERVAL + 1);

    assert!(engine.zone.vessels.get(id).is_none());
    assert!(engine
        .outbox
        .iter()
        .any(|e| matches!(e, SimEvent::Wrecked(w) if *w == id)));
    assert!(engine.outbox.contains_line("takes on water"));
    assert!(engine.outbox.contains_line("closes over the wreck"));
}

#[test]
fn staff_exempt_vessels_never_decay() {
    let mut engine = open_sea_engine();
    let (id, _) = crewed_vessel(&mut engine);
    engine.zone.vessels.get_mut(id).unwrap().staff_exempt = true;
    hasten_decay(&mut engine, id, 3);
    engine.advance(3 + decay::STAGES as u64 * decay::STAGE_INTERVAL + 1);
    assert!(engine.zone.vessels.get(id).is_some());
}

#[test]
fn staff_refresh_cancels_a_running_countdown() {
    let mut engine = open_sea_engine();
    let (id, _) = crewed_vessel(&mut engine);
    hasten_decay(&mut engine, id, 2);
    // Into the countdown, one stage deep.
    engine.advance(2 + decay::STAGE_INTERVAL);
    assert!(engine.zone.vessels.get(id).unwrap().is_decaying());

    assert!(!engine.refresh(id, false), "crew cannot cancel the countdown");
    assert!(engine.refresh(id, true));
    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.state, MovementState::Idle);

    engine.advance(decay::STAGES as u64 * decay::STAGE_INTERVAL + 2);
    assert!(engine.zone.vessels.get(id).is_some());
}

// --- Navigation ---

#[test]
fn full_course_sails_legs_turns_and_completes() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let chart = engine.zone.objects.spawn((
        Position::at(helm),
        Chart {
            pins: vec![CellPos::new(100, 90, 0), CellPos::new(110, 90, 0)],
        },
    ));
    engine.assign_chart(id, chart).unwrap();
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(id, actor, HelmOrder::StartCourse);
    engine.advance(600);

    let vessel = engine.zone.vessels.get(id).unwrap();
    assert_eq!(vessel.facing, Facing::East, "steered east for the second leg");
    let origin = vessel.origin;
    assert!(
        (origin.x - 110).abs() <= 1 && (origin.y - 90).abs() <= 1,
        "finished at the last pin, got {origin:?}"
    );
    assert!(engine.outbox.contains_line("course is complete"));
    assert_eq!(vessel.state, MovementState::Idle);
}

#[test]
fn single_leg_mode_halts_after_first_arrival() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let chart = engine.zone.objects.spawn((
        Position::at(helm),
        Chart {
            pins: vec![CellPos::new(100, 90, 0), CellPos::new(110, 90, 0)],
        },
    ));
    engine.assign_chart(id, chart).unwrap();
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(id, actor, HelmOrder::SingleLeg(0));
    engine.advance(600);

    let vessel = engine.zone.vessels.get(id).unwrap();
    assert!((vessel.origin.y - 90).abs() <= 1);
    assert_eq!(vessel.origin.x, 100, "did not sail on to the second pin");
    assert_eq!(vessel.state, MovementState::Idle);
}

#[test]
fn course_preconditions_are_refused() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);

    // Anchored.
    engine.command(id, actor, HelmOrder::StartCourse);
    assert!(engine.outbox.contains_line("anchor is down"));
    engine.outbox.drain();

    // No chart assigned.
    engine.command(id, actor, HelmOrder::RaiseAnchor);
    engine.command(id, actor, HelmOrder::StartCourse);
    assert!(engine.outbox.contains_line("no chart"));
    engine.outbox.drain();

    // Chart assigned but ashore.
    let chart = engine.zone.objects.spawn((
        Position::at(CellPos::new(5, 5, 0)),
        Chart {
            pins: vec![CellPos::new(100, 90, 0)],
        },
    ));
    engine.assign_chart(id, chart).unwrap();
    engine.command(id, actor, HelmOrder::StartCourse);
    assert!(engine.outbox.contains_line("isn't aboard"));
    engine.outbox.drain();

    // Bad leg index.
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    engine
        .zone
        .objects
        .query_one_mut::<&mut Position>(chart)
        .unwrap()
        .cell = helm;
    engine.command(id, actor, HelmOrder::GotoLeg(7));
    assert!(engine.outbox.contains_line("no such mark"));
}

#[test]
fn query_nav_point_reports_the_next_pin() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let chart = engine.zone.objects.spawn((
        Position::at(helm),
        Chart {
            pins: vec![CellPos::new(100, 90, 0)],
        },
    ));
    engine.assign_chart(id, chart).unwrap();
    engine.command(id, actor, HelmOrder::QueryNavPoint);
    assert!(engine.outbox.contains_line("leg 0"));
    assert!(engine.outbox.contains_line("(100, 90)"));
}

// --- Naming ---

#[test]
fn naming_round_trip() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::SetName("Sea Wisp".to_string()));
    assert_eq!(
        engine.zone.vessels.get(id).unwrap().name.as_deref(),
        Some("Sea Wisp")
    );
    engine.command(id, actor, HelmOrder::QueryName);
    assert!(engine.outbox.contains_line("Sea Wisp"));

    engine.command(id, actor, HelmOrder::ClearName);
    assert!(engine.zone.vessels.get(id).unwrap().name.is_none());
}

// --- Persistence ---

#[test]
fn fleet_snapshot_round_trips_through_the_engine() {
    let mut engine = open_sea_engine();
    let (id, actor) = crewed_vessel(&mut engine);
    engine.command(id, actor, HelmOrder::SetName("Kestrel".to_string()));
    engine.stow(id, actor, ids::KIND_CRATE, 4).unwrap();
    let second = engine
        .place_class(HullClass::Large, CellPos::new(30, 30, 0), Facing::West, Some(9))
        .unwrap();

    let mut buffer = Vec::new();
    engine.save(&mut buffer).unwrap();

    let mut restored = open_sea_engine();
    assert_eq!(restored.load(&buffer[..]).unwrap(), 2);

    let a = restored.zone.vessels.get(id).unwrap();
    assert_eq!(a.name.as_deref(), Some("Kestrel"));
    assert_eq!(a.origin, CellPos::new(100, 100, 0));
    assert_eq!(a.hold.stored(), 4);
    assert!(a.anchored);
    let b = restored.zone.vessels.get(second).unwrap();
    assert_eq!(b.class, HullClass::Large);
    assert_eq!(b.facing, Facing::West);
    assert_eq!(b.owner, Some(9));
}
