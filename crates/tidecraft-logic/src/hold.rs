//! Cargo hold gating — pure checks for stow and withdraw requests.
//!
//! The hold is usable only by an occupant who is aboard, holding the hold's
//! key, while the vessel is neither moving nor turning. Capacity is tiered by
//! hull class (see [`crate::constants::hold_tiers`]).

use serde::{Deserialize, Serialize};

/// A request to stow into or withdraw from the hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldRequest {
    /// The requester stands within the vessel footprint.
    pub aboard: bool,
    /// The requester holds the hold's key.
    pub has_key: bool,
    /// The vessel is currently moving or turning.
    pub underway: bool,
    /// Lots already stowed.
    pub stored: u16,
    /// Hold capacity in lots.
    pub capacity: u16,
    /// Lots being stowed (zero for a withdrawal).
    pub stowing: u16,
}

/// Why a hold operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldDenial {
    NotAboard,
    Locked,
    Underway,
    Overfull,
}

/// Check a hold request. `Ok(())` means the operation may proceed.
pub fn check_hold(req: &HoldRequest) -> Result<(), HoldDenial> {
    if !req.aboard {
        return Err(HoldDenial::NotAboard);
    }
    if req.underway {
        return Err(HoldDenial::Underway);
    }
    if !req.has_key {
        return Err(HoldDenial::Locked);
    }
    if req.stored.saturating_add(req.stowing) > req.capacity {
        return Err(HoldDenial::Overfull);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> HoldRequest {
        HoldRequest {
            aboard: true,
            has_key: true,
            underway: false,
            stored: 10,
            capacity: 40,
            stowing: 1,
        }
    }

    #[test]
    fn keyed_occupant_may_stow() {
        assert_eq!(check_hold(&req()), Ok(()));
    }

    #[test]
    fn refused_while_underway() {
        let mut r = req();
        r.underway = true;
        assert_eq!(check_hold(&r), Err(HoldDenial::Underway));
    }

    #[test]
    fn refused_without_key() {
        let mut r = req();
        r.has_key = false;
        assert_eq!(check_hold(&r), Err(HoldDenial::Locked));
    }

    #[test]
    fn refused_ashore() {
        let mut r = req();
        r.aboard = false;
        assert_eq!(check_hold(&r), Err(HoldDenial::NotAboard));
    }

    #[test]
    fn capacity_is_a_hard_limit() {
        let mut r = req();
        r.stored = 40;
        assert_eq!(check_hold(&r), Err(HoldDenial::Overfull));
        r.stored = 39;
        assert_eq!(check_hold(&r), Ok(()));
    }

    #[test]
    fn withdrawal_ignores_capacity() {
        let mut r = req();
        r.stored = 40;
        r.stowing = 0;
        assert_eq!(check_hold(&r), Ok(()));
    }
}
