//! The event outbox — narrative lines, effect cues, and lifecycle notices
//! produced by a tick, drained by the host after each advance.

use tidecraft_logic::grid::CellPos;

use crate::vessel::VesselId;

/// Who should see a narrative line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// One actor, by entity bits.
    Actor(u64),
    /// Everyone aboard the vessel.
    Deck(VesselId),
    /// Bystanders around a cell.
    Locality(CellPos),
}

/// Localized audiovisual cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Hull thudding against a soft obstruction.
    Bump,
    /// An obstruction pushed under the surface.
    Splash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Line { audience: Audience, text: String },
    Cue { cell: CellPos, cue: Cue },
    Placed(VesselId),
    Docked(VesselId),
    Wrecked(VesselId),
}

/// Per-tick event buffer.
#[derive(Default)]
pub struct Outbox {
    events: Vec<SimEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn line(&mut self, audience: Audience, text: impl Into<String>) {
        self.events.push(SimEvent::Line {
            audience,
            text: text.into(),
        });
    }

    pub fn cue(&mut self, cell: CellPos, cue: Cue) {
        self.events.push(SimEvent::Cue { cell, cue });
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    /// All line texts, in emission order. Test convenience.
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Line { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_line(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer() {
        let mut out = Outbox::new();
        out.line(Audience::Actor(1), "ahoy");
        out.cue(CellPos::new(0, 0, 0), Cue::Bump);
        assert_eq!(out.drain().len(), 2);
        assert!(out.drain().is_empty());
    }

    #[test]
    fn texts_filters_lines() {
        let mut out = Outbox::new();
        out.cue(CellPos::new(0, 0, 0), Cue::Splash);
        out.line(Audience::Deck(VesselId(1)), "We've stopped.");
        assert_eq!(out.texts(), vec!["We've stopped."]);
        assert!(out.contains_line("stopped"));
    }
}
