//! Tidecraft Headless Simulation Harness
//!
//! Runs scripted voyages against the engine entirely in-process — no game
//! host, no networking, no rendering — and prints a pass/fail transcript.
//!
//! Usage:
//!   cargo run -p tidecraft-simtest
//!   cargo run -p tidecraft-simtest -- --verbose

use tidecraft_core::commands::HelmOrder;
use tidecraft_core::components::{Body, Carried, Chart, Inventory, Mobile, Position};
use tidecraft_core::engine::Engine;
use tidecraft_core::movement::GaitKind;
use tidecraft_core::vessel::{MovementState, VesselId};
use tidecraft_core::world::{GridMap, StaticTile, TerrainTile, Zone};

use tidecraft_logic::classify::{ids, Classification};
use tidecraft_logic::constants::gait;
use tidecraft_logic::footprint::HullClass;
use tidecraft_logic::grid::{CellPos, Facing, Heading, Rect};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    log::info!("harness starting");
    println!("=== Tidecraft Simulation Harness ===\n");

    let mut results = Vec::new();

    results.extend(validate_open_water_voyage(verbose));
    results.extend(validate_obstructed_bow(verbose));
    results.extend(validate_corpse_salvage(verbose));
    results.extend(validate_helm_authority(verbose));
    results.extend(validate_charted_course(verbose));
    results.extend(validate_fleet_snapshot(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if json {
        let report: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "name": r.name,
                    "passed": r.passed,
                    "detail": r.detail,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared rigging ──────────────────────────────────────────────────────

fn open_sea() -> Engine {
    let map = GridMap::filled(
        0,
        Rect::new(0, 0, 255, 255),
        TerrainTile {
            id: ids::TERRAIN_OPEN_WATER,
            z: 0,
        },
    );
    Engine::new(Zone::new(Box::new(map), Classification::default_sea()))
}

fn crewed(engine: &mut Engine, x: i32, y: i32) -> (VesselId, hecs::Entity) {
    let id = engine
        .place_class(HullClass::Medium, CellPos::new(x, y, 0), Facing::North, None)
        .expect("open water placement");
    let key = engine.zone.vessels.get(id).unwrap().key;
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let actor = engine.zone.objects.spawn((
        Position::at(helm),
        Mobile::named("Skipper"),
        Inventory::with(vec![Carried::Key(key)]),
    ));
    (id, actor)
}

fn origin(engine: &Engine, id: VesselId) -> CellPos {
    engine.zone.vessels.get(id).unwrap().origin
}

// ── 1. Open-water voyage ────────────────────────────────────────────────

fn validate_open_water_voyage(verbose: bool) -> Vec<TestResult> {
    println!("--- Open-water voyage ---");
    let mut results = Vec::new();
    let mut engine = open_sea();
    let (id, skipper) = crewed(&mut engine, 100, 100);

    engine.command(id, skipper, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        skipper,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL * 3);

    let pos = origin(&engine, id);
    results.push(check(
        "full_sail_north",
        pos == CellPos::new(100, 91, 0),
        format!("after three ticks at full sail: {pos:?}"),
    ));

    engine.command(id, skipper, HelmOrder::TurnRight);
    engine.advance(tidecraft_logic::constants::TURN_DELAY);
    let facing = engine.zone.vessels.get(id).unwrap().facing;
    results.push(check(
        "come_about_east",
        facing == Facing::East,
        format!("facing after turn: {facing:?}"),
    ));

    engine.command(id, skipper, HelmOrder::Stop);
    engine.command(id, skipper, HelmOrder::LowerAnchor);
    let vessel = engine.zone.vessels.get(id).unwrap();
    results.push(check(
        "anchored_at_rest",
        vessel.anchored && vessel.state == MovementState::Idle,
        "anchor down, hull idle",
    ));

    if verbose {
        for line in engine.outbox.texts() {
            println!("    deck: {line}");
        }
    }
    results
}

// ── 2. Obstructed bow ───────────────────────────────────────────────────

fn validate_obstructed_bow(_verbose: bool) -> Vec<TestResult> {
    println!("--- Obstructed bow ---");
    let mut results = Vec::new();

    let mut map = GridMap::filled(
        0,
        Rect::new(0, 0, 255, 255),
        TerrainTile {
            id: ids::TERRAIN_OPEN_WATER,
            z: 0,
        },
    );
    // A medium hull at (100,100) facing north newly enters row y=95.
    map.add_static(
        100,
        95,
        StaticTile {
            id: ids::KIND_REEF_SPUR,
            z: 0,
            height: 2,
        },
    );
    let mut engine = Engine::new(Zone::new(Box::new(map), Classification::default_sea()));
    let (id, skipper) = crewed(&mut engine, 100, 100);

    engine.command(id, skipper, HelmOrder::RaiseAnchor);
    engine.command(
        id,
        skipper,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);

    results.push(check(
        "reef_stops_the_hull",
        origin(&engine, id) == CellPos::new(100, 100, 0),
        "hull held station before the reef",
    ));
    results.push(check(
        "stop_is_reported",
        engine.outbox.contains_line("We've stopped."),
        "deck heard the stop",
    ));
    results
}

// ── 3. Corpse salvage ───────────────────────────────────────────────────

fn validate_corpse_salvage(_verbose: bool) -> Vec<TestResult> {
    println!("--- Corpse salvage ---");
    let mut results = Vec::new();
    let mut engine = open_sea();
    let corpse = engine.zone.objects.spawn((
        Position::at(CellPos::new(100, 95, 0)),
        Body::new(ids::KIND_CORPSE),
    ));
    let (id, skipper) = crewed(&mut engine, 100, 100);
    engine.command(id, skipper, HelmOrder::RaiseAnchor);

    let corpse_z = |engine: &Engine| engine.zone.objects.get::<&Position>(corpse).unwrap().cell.z;

    engine.command(
        id,
        skipper,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);
    results.push(check(
        "first_contact_is_a_bump",
        corpse_z(&engine) == 0 && origin(&engine, id) == CellPos::new(100, 100, 0),
        "grazed corpse untouched",
    ));

    engine.command(
        id,
        skipper,
        HelmOrder::Start {
            heading: Heading::Forward,
            gait: GaitKind::Fast,
        },
    );
    engine.advance(gait::FAST_INTERVAL);
    results.push(check(
        "second_contact_sinks_one_step",
        corpse_z(&engine) == -1,
        format!("corpse z = {}", corpse_z(&engine)),
    ));
    results
}

// ── 4. Helm authority ───────────────────────────────────────────────────

fn validate_helm_authority(_verbose: bool) -> Vec<TestResult> {
    println!("--- Helm authority ---");
    let mut results = Vec::new();
    let mut engine = open_sea();
    let id = engine
        .place_class(HullClass::Medium, CellPos::new(60, 60, 0), Facing::North, None)
        .unwrap();
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();

    let near = engine
        .zone
        .objects
        .spawn((Position::at(helm), Mobile::named("Bosun")));
    let far = engine.zone.objects.spawn((
        Position::at(CellPos::new(60, 58, 0)),
        Mobile::named("Deckhand"),
    ));

    engine.command(id, far, HelmOrder::RaiseAnchor);
    results.push(check(
        "far_hand_refused",
        engine.zone.vessels.get(id).unwrap().anchored,
        "distant keyless hand cannot command",
    ));

    engine.command(id, near, HelmOrder::RaiseAnchor);
    results.push(check(
        "nearest_hand_obeyed",
        !engine.zone.vessels.get(id).unwrap().anchored,
        "nearest keyless hand commands when no key is aboard",
    ));
    results
}

// ── 5. Charted course ───────────────────────────────────────────────────

fn validate_charted_course(verbose: bool) -> Vec<TestResult> {
    println!("--- Charted course ---");
    let mut results = Vec::new();
    let mut engine = open_sea();
    let (id, skipper) = crewed(&mut engine, 100, 100);
    let helm = engine.zone.vessels.get(id).unwrap().helm_cell();
    let chart = engine.zone.objects.spawn((
        Position::at(helm),
        Chart {
            pins: vec![CellPos::new(100, 88, 0), CellPos::new(112, 88, 0)],
        },
    ));
    engine.assign_chart(id, chart).expect("chart on the helm");
    engine.command(id, skipper, HelmOrder::RaiseAnchor);
    engine.command(id, skipper, HelmOrder::StartCourse);
    engine.advance(800);

    let vessel = engine.zone.vessels.get(id).unwrap();
    let pos = vessel.origin;
    results.push(check(
        "course_complete",
        engine.outbox.contains_line("course is complete"),
        "deck heard the completion",
    ));
    results.push(check(
        "moored_at_last_pin",
        (pos.x - 112).abs() <= 1 && (pos.y - 88).abs() <= 1,
        format!("final position {pos:?}"),
    ));
    results.push(check(
        "steered_east_for_second_leg",
        vessel.facing == Facing::East,
        format!("final facing {:?}", vessel.facing),
    ));

    if verbose {
        for line in engine.outbox.texts() {
            println!("    deck: {line}");
        }
    }
    results
}

// ── 6. Fleet snapshot ───────────────────────────────────────────────────

fn validate_fleet_snapshot(_verbose: bool) -> Vec<TestResult> {
    println!("--- Fleet snapshot ---");
    let mut results = Vec::new();
    let mut engine = open_sea();
    let (id, skipper) = crewed(&mut engine, 100, 100);
    engine.command(id, skipper, HelmOrder::SetName("Petrel".to_string()));
    engine.stow(id, skipper, ids::KIND_CRATE, 6).expect("stow");

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(check("snapshot_save", false, format!("save failed: {e}")));
        return results;
    }

    let mut restored = open_sea();
    match restored.load(&buffer[..]) {
        Ok(count) => {
            let vessel = restored.zone.vessels.get(id);
            let ok = count == 1
                && vessel.map(|v| v.name.as_deref() == Some("Petrel")).unwrap_or(false)
                && vessel.map(|v| v.hold.stored() == 6).unwrap_or(false);
            results.push(check(
                "snapshot_round_trip",
                ok,
                format!("{count} vessel(s) restored with name and cargo"),
            ));
        }
        Err(e) => results.push(check(
            "snapshot_round_trip",
            false,
            format!("load failed: {e}"),
        )),
    }
    results
}
