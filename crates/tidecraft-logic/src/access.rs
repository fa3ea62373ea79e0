//! Helm command authorization.
//!
//! Decision order:
//!
//! 1. Staff override bypasses every check.
//! 2. A physical jam — a movable foreign object on a helm-adjacent deck
//!    cell — refuses command regardless of credentials.
//! 3. An occupant holding the shared key (directly, on a keyring, or — under
//!    the salvage rule variant — found on a dead holder's remains) is
//!    authorized.
//! 4. If *no* occupant holds the key, the occupant strictly closest to the
//!    helm by squared planar distance is authorized; a tie authorizes nobody.
//!
//! The caller gathers the roster (who is aboard, who holds what, distances)
//! from world state; this module only decides.

use serde::{Deserialize, Serialize};

/// One occupant of the vessel, as seen by the authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Petitioner {
    /// Stable occupant identifier (entity bits).
    pub id: u64,
    /// Administrative override.
    pub is_staff: bool,
    /// Holds the vessel's shared key, directly or via keyring. The caller
    /// folds the dead-holder rule variant into this flag when it gathers
    /// the roster.
    pub holds_key: bool,
    /// Squared planar distance to the helm cell.
    pub dist_sq: i64,
}

/// A request to command the vessel from the helm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmRequest {
    /// The occupant issuing the command.
    pub actor: u64,
    /// A movable foreign object sits on a helm-adjacent deck cell.
    pub deck_jammed: bool,
    /// Everyone currently aboard, including the actor.
    pub roster: Vec<Petitioner>,
}

/// Why a helm command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelmDenial {
    /// Something movable is blocking the helm; clear the deck first.
    DeckJammed,
    /// The actor is not aboard this vessel.
    NotAboard,
    /// Another occupant holds the authority (key or proximity), or the
    /// nearest-occupant fallback found no strict winner.
    NotAuthorized,
}

/// Result of a helm authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmDecision {
    pub allowed: bool,
    pub denial: Option<HelmDenial>,
    /// The actor won through the nearest-occupant fallback rather than a key.
    pub by_proximity: bool,
}

impl HelmDecision {
    fn allow(by_proximity: bool) -> Self {
        Self {
            allowed: true,
            denial: None,
            by_proximity,
        }
    }

    fn deny(denial: HelmDenial) -> Self {
        Self {
            allowed: false,
            denial: Some(denial),
            by_proximity: false,
        }
    }
}

/// Decide whether the requesting occupant may command the vessel.
pub fn decide_helm(req: &HelmRequest) -> HelmDecision {
    let Some(actor) = req.roster.iter().find(|p| p.id == req.actor) else {
        return HelmDecision::deny(HelmDenial::NotAboard);
    };

    // Staff bypass everything, including a jammed deck.
    if actor.is_staff {
        return HelmDecision::allow(false);
    }

    // A physical jam overrides authorization.
    if req.deck_jammed {
        return HelmDecision::deny(HelmDenial::DeckJammed);
    }

    if actor.holds_key {
        return HelmDecision::allow(false);
    }

    // Key held by someone else aboard: only key-holders command.
    if req.roster.iter().any(|p| p.holds_key) {
        return HelmDecision::deny(HelmDenial::NotAuthorized);
    }

    // No key-holder aboard: the strictly nearest occupant to the helm wins.
    let best = req.roster.iter().map(|p| p.dist_sq).min();
    match best {
        Some(best) => {
            let winners: Vec<&Petitioner> =
                req.roster.iter().filter(|p| p.dist_sq == best).collect();
            if winners.len() == 1 && winners[0].id == req.actor {
                HelmDecision::allow(true)
            } else {
                // Tie, or someone else is closer: no single actor is
                // strictly closest from this actor's point of view.
                HelmDecision::deny(HelmDenial::NotAuthorized)
            }
        }
        None => HelmDecision::deny(HelmDenial::NotAboard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(id: u64, holds_key: bool, dist_sq: i64) -> Petitioner {
        Petitioner {
            id,
            is_staff: false,
            holds_key,
            dist_sq,
        }
    }

    #[test]
    fn key_holder_commands() {
        let req = HelmRequest {
            actor: 1,
            deck_jammed: false,
            roster: vec![hand(1, true, 9), hand(2, false, 1)],
        };
        let d = decide_helm(&req);
        assert!(d.allowed);
        assert!(!d.by_proximity);
    }

    #[test]
    fn keyless_actor_refused_when_key_is_aboard() {
        let req = HelmRequest {
            actor: 2,
            deck_jammed: false,
            roster: vec![hand(1, true, 9), hand(2, false, 1)],
        };
        let d = decide_helm(&req);
        assert!(!d.allowed);
        assert_eq!(d.denial, Some(HelmDenial::NotAuthorized));
    }

    #[test]
    fn nearest_occupant_fallback() {
        let req = HelmRequest {
            actor: 2,
            deck_jammed: false,
            roster: vec![hand(1, false, 9), hand(2, false, 1)],
        };
        let d = decide_helm(&req);
        assert!(d.allowed);
        assert!(d.by_proximity);
    }

    #[test]
    fn fallback_loser_refused() {
        let req = HelmRequest {
            actor: 1,
            deck_jammed: false,
            roster: vec![hand(1, false, 9), hand(2, false, 1)],
        };
        assert!(!decide_helm(&req).allowed);
    }

    #[test]
    fn distance_tie_authorizes_nobody() {
        let req = HelmRequest {
            actor: 1,
            deck_jammed: false,
            roster: vec![hand(1, false, 4), hand(2, false, 4)],
        };
        assert!(!decide_helm(&req).allowed);
        let req = HelmRequest {
            actor: 2,
            ..req
        };
        assert!(!decide_helm(&req).allowed);
    }

    #[test]
    fn jam_refuses_even_key_holders() {
        let req = HelmRequest {
            actor: 1,
            deck_jammed: true,
            roster: vec![hand(1, true, 0)],
        };
        let d = decide_helm(&req);
        assert!(!d.allowed);
        assert_eq!(d.denial, Some(HelmDenial::DeckJammed));
    }

    #[test]
    fn staff_bypass_jam_and_keys() {
        let mut staff = hand(3, false, 100);
        staff.is_staff = true;
        let req = HelmRequest {
            actor: 3,
            deck_jammed: true,
            roster: vec![hand(1, true, 0), staff],
        };
        assert!(decide_helm(&req).allowed);
    }

    #[test]
    fn absent_actor_refused() {
        let req = HelmRequest {
            actor: 7,
            deck_jammed: false,
            roster: vec![hand(1, false, 1)],
        };
        assert_eq!(decide_helm(&req).denial, Some(HelmDenial::NotAboard));
    }
}
