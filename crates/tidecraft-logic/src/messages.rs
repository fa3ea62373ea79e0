//! Refusal reasons and the narrative lines the crew hears.
//!
//! Refusals are values, not errors: every non-fatal failure maps to a reason
//! here and leaves vessel state untouched. The engine picks the line and
//! routes it to the right audience.

use serde::{Deserialize, Serialize};

/// Every way a command or operation can be refused without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refusal {
    // Physical
    Blocked,
    ForbiddenWaters,
    CannotTurn,
    Foundering,
    // Authorization
    DeckJammed,
    NotAuthorized,
    NotAboard,
    // Preconditions
    Anchored,
    AlreadyAnchored,
    AnchorAlreadyRaised,
    HoldLocked,
    HoldUnderway,
    HoldOverfull,
    HoldAshore,
    PlankLocked,
    DryDockLaden,
    NoChart,
    ChartNotAboard,
    BadLeg,
}

/// The fixed line for a refusal reason. Unauthorized-helm refusals instead
/// rotate through [`HELM_REFUSALS`].
pub fn refusal_line(refusal: Refusal) -> &'static str {
    match refusal {
        Refusal::Blocked => "We've stopped.",
        Refusal::ForbiddenWaters => "The crew refuses to sail into those waters.",
        Refusal::CannotTurn => "We can't turn that way!",
        Refusal::Foundering => "The vessel is foundering!",
        Refusal::DeckJammed => "Clear the deck before giving orders!",
        Refusal::NotAuthorized => HELM_REFUSALS[0],
        Refusal::NotAboard => "You must be aboard to give that order.",
        Refusal::Anchored => "The anchor is down; raise it first.",
        Refusal::AlreadyAnchored => "The anchor is already down.",
        Refusal::AnchorAlreadyRaised => "The anchor is already up.",
        Refusal::HoldLocked => "The hold is locked.",
        Refusal::HoldUnderway => "Secure the hold while we're underway!",
        Refusal::HoldOverfull => "The hold can carry no more.",
        Refusal::HoldAshore => "Come aboard to use the hold.",
        Refusal::PlankLocked => "The plank is locked.",
        Refusal::DryDockLaden => "Empty the hold before dry-docking.",
        Refusal::NoChart => "We have no chart to follow.",
        Refusal::ChartNotAboard => "The chart isn't aboard.",
        Refusal::BadLeg => "That course has no such mark.",
    }
}

/// Flavor rotation for unauthorized helm commands. The engine picks an
/// index; callers cycle or randomize as they like.
pub const HELM_REFUSALS: [&str; 4] = [
    "I don't take orders from you.",
    "Only the master of this vessel commands here.",
    "And who might you be to give that order?",
    "The helm doesn't answer to you.",
];

pub fn helm_refusal(index: usize) -> &'static str {
    HELM_REFUSALS[index % HELM_REFUSALS.len()]
}

/// Countdown lines spoken as an abandoned vessel settles, last stage first
/// in severity. Indexed by stage number.
pub const DECAY_LINES: [&str; 5] = [
    "The hull groans and takes on water.",
    "The deck lists; the sea climbs higher.",
    "Waves wash over the gunwales.",
    "The vessel is nearly lost beneath the surface.",
    "The sea closes over the wreck.",
];

pub fn decay_line(stage: u8) -> &'static str {
    DECAY_LINES[(stage as usize).min(DECAY_LINES.len() - 1)]
}

// Progress and completion lines.
pub const LINE_STOPPED: &str = "We've stopped.";
pub const LINE_ANCHOR_DOWN: &str = "Anchor lowered.";
pub const LINE_ANCHOR_UP: &str = "Anchor raised.";
pub const LINE_COURSE_COMPLETE: &str = "We have arrived; the course is complete.";
pub const LINE_LEG_REACHED: &str = "Mark reached; sailing on.";
pub const LINE_NAME_CLEARED: &str = "The vessel's name is struck.";
