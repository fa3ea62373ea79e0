//! Waypoint leg plotting — pure bearing math for the navigation module.
//!
//! Each navigation tick re-plots the current leg from scratch: arrival test
//! first, then either a steer (perpendicular cardinal bearing) or an advance
//! along the signum vector. The engine decides how many of the advised cells
//! actually fit.

use serde::{Deserialize, Serialize};

use crate::grid::Facing;

/// What the helm should do this tick to progress a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegStep {
    /// Within one cell of the pin on both axes.
    Arrived,
    /// Bearing is perpendicular to the current facing; come about first.
    Steer { to: Facing },
    /// Step along `dir` up to `cells` cells (the fittable maximum may be
    /// smaller).
    Advance { dir: (i32, i32), cells: i32 },
}

/// Plot the next action toward a pin for a hull at `origin` facing `facing`.
///
/// Diagonal bearings advance as drifts without changing facing; cardinal
/// bearings perpendicular to the facing axis steer instead of stepping.
pub fn plot_leg(origin: (i32, i32), pin: (i32, i32), facing: Facing) -> LegStep {
    let dx = pin.0 - origin.0;
    let dy = pin.1 - origin.1;

    if dx.abs() <= 1 && dy.abs() <= 1 {
        return LegStep::Arrived;
    }

    let dir = (dx.signum(), dy.signum());

    if dir.0 != 0 && dir.1 != 0 {
        // Diagonal drift: close the shorter axis first.
        return LegStep::Advance {
            dir,
            cells: dx.abs().min(dy.abs()),
        };
    }

    // Cardinal bearing.
    let desired = Facing::of_vector(dir.0, dir.1).expect("cardinal signum vector");
    if desired == facing || desired == facing.rotated(2) {
        // Along the facing axis: sail forward or astern without turning.
        LegStep::Advance {
            dir,
            cells: dx.abs().max(dy.abs()),
        }
    } else {
        LegStep::Steer { to: desired }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_within_one_cell() {
        assert_eq!(plot_leg((10, 10), (10, 10), Facing::North), LegStep::Arrived);
        assert_eq!(plot_leg((10, 10), (11, 9), Facing::North), LegStep::Arrived);
        assert_ne!(plot_leg((10, 10), (12, 10), Facing::North), LegStep::Arrived);
    }

    #[test]
    fn along_axis_advances_without_turn() {
        // Pin due north, facing north: advance the full distance.
        assert_eq!(
            plot_leg((10, 10), (10, 4), Facing::North),
            LegStep::Advance { dir: (0, -1), cells: 6 }
        );
        // Pin due south, facing north: sail astern, still no turn.
        assert_eq!(
            plot_leg((10, 10), (10, 15), Facing::North),
            LegStep::Advance { dir: (0, 1), cells: 5 }
        );
    }

    #[test]
    fn perpendicular_bearing_steers() {
        assert_eq!(
            plot_leg((10, 10), (20, 10), Facing::North),
            LegStep::Steer { to: Facing::East }
        );
        assert_eq!(
            plot_leg((10, 10), (2, 10), Facing::South),
            LegStep::Steer { to: Facing::West }
        );
    }

    #[test]
    fn diagonal_bearing_drifts() {
        assert_eq!(
            plot_leg((10, 10), (14, 2), Facing::North),
            LegStep::Advance { dir: (1, -1), cells: 4 }
        );
    }

    #[test]
    fn diagonal_closes_shorter_axis_then_goes_cardinal() {
        // After the drift above, the remaining bearing is cardinal.
        let step = plot_leg((14, 6), (14, 2), Facing::North);
        assert_eq!(step, LegStep::Advance { dir: (0, -1), cells: 4 });
    }
}
