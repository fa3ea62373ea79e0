//! Tidecraft simulation engine.
//!
//! Discrete-tick, single-threaded, deterministic given its inputs: all
//! vessel mutation happens inside scheduled task callbacks dispatched by the
//! [`engine::Engine`], and the collision engine only ever reads.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`collision`] | The fit engine: terrain, statics, objects, other hulls |
//! | [`commands`] | Helm order protocol and the authorization gate |
//! | [`components`] | ECS components for loose objects and actors |
//! | [`decay`] | Inactivity deadlines and the destructive countdown |
//! | [`engine`] | Zone + scheduler + clock facade |
//! | [`events`] | Narrative/effect outbox drained by the host |
//! | [`fixtures`] | Planks, the cargo hold, chart drops on the helm |
//! | [`movement`] | Translation ticks, turns, anchoring, sinkables |
//! | [`navigation`] | Waypoint course following |
//! | [`persistence`] | Versioned fleet snapshots |
//! | [`scheduler`] | The zone-wide deadline priority queue |
//! | [`vessel`] | The vessel aggregate, registry, placement, dry-dock |
//! | [`world`] | Map trait, zone state, rule-set configuration |

pub mod collision;
pub mod commands;
pub mod components;
pub mod decay;
pub mod engine;
pub mod events;
pub mod fixtures;
pub mod movement;
pub mod navigation;
pub mod persistence;
pub mod scheduler;
pub mod vessel;
pub mod world;
