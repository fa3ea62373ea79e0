//! Pure vessel-simulation logic for Tidecraft.
//!
//! This crate contains all vessel logic that is independent of any world
//! state, scheduler, or engine. Functions take plain data and return results,
//! making them unit-testable and portable between the native engine, headless
//! harnesses, and any future host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`access`] | Helm command authorization (keys, proximity fallback, jams) |
//! | [`classify`] | Terrain and object classification tables |
//! | [`constants`] | Gaits, draft, decay, sink steps, hold tiers |
//! | [`course`] | Waypoint leg plotting (bearing, steer-or-advance, arrival) |
//! | [`footprint`] | Hull plans, per-facing cell sets, fixture offsets |
//! | [`grid`] | Cells, facings, headings, exact quarter-turn rotation |
//! | [`hold`] | Cargo hold capacity tiers and stow gating |
//! | [`messages`] | Refusal reasons and narrative text |

pub mod access;
pub mod classify;
pub mod constants;
pub mod course;
pub mod footprint;
pub mod grid;
pub mod hold;
pub mod messages;
