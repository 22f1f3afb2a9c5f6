//=========================================================================
// Fairness Policy
//=========================================================================
//
// Rebalances which direction may feed the bridge so neither side starves.
//
// State machine:
// ```text
//            both sides have demand
//   Idle ──────────────────────────────► Mixed
//    │ ▲                                  │ │
//    │ │ one side has demand              │ │ one side drained
//    ▼ │                                  │ ▼
//   Exclusive(dir) ◄──────────────────────┘ Exclusive(other) / Idle
//          └───── opposing demand appears ─────► Mixed
// ```
//
// Exclusive flags are cleared on exit by the release path; this module
// only sets them, and clears both when entering Mixed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::state::BridgeState;
use crate::core::vehicle::Direction;

//=== TrafficPhase ========================================================

/// Traffic phase derived from the active and mixed-use flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficPhase {
    Idle,
    Exclusive(Direction),
    Mixed,
}

impl fmt::Display for TrafficPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Exclusive(direction) => write!(f, "exclusive {}", direction),
            Self::Mixed => write!(f, "mixed-use"),
        }
    }
}

//=== Rebalance ===========================================================

impl BridgeState {
    /// Current phase of the traffic state machine.
    pub fn phase(&self) -> TrafficPhase {
        if self.mixed_use {
            TrafficPhase::Mixed
        } else if self.north_active {
            TrafficPhase::Exclusive(Direction::Northbound)
        } else if self.south_active {
            TrafficPhase::Exclusive(Direction::Southbound)
        } else {
            TrafficPhase::Idle
        }
    }

    /// Applies one step of the fairness policy.
    ///
    /// Returns the `(from, to)` phases when the phase changed. The caller
    /// is expected to wake every waiter afterwards either way.
    pub fn rebalance(&mut self) -> Option<(TrafficPhase, TrafficPhase)> {
        let before = self.phase();
        let north = self.demand(Direction::Northbound);
        let south = self.demand(Direction::Southbound);

        if !self.mixed_use && north > 0 && south > 0 {
            self.mixed_use = true;
            self.north_active = false;
            self.south_active = false;
        } else if self.mixed_use && (north == 0 || south == 0) {
            self.mixed_use = false;
            if north > 0 {
                self.north_active = true;
            } else if south > 0 {
                self.south_active = true;
            }
        } else if !self.mixed_use {
            if north > 0 && !self.south_active {
                self.north_active = true;
            } else if south > 0 && !self.north_active {
                self.south_active = true;
            }
        }

        self.debug_check_invariants();

        let after = self.phase();
        (before != after).then_some((before, after))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vehicle::{Vehicle, VehicleClass};

    fn state_with(north: &[u32], south: &[u32]) -> BridgeState {
        let mut state = BridgeState::new(1200, 100);
        for &id in north {
            state.enqueue(Vehicle::new(id, VehicleClass::Car, Direction::Northbound));
        }
        for &id in south {
            state.enqueue(Vehicle::new(id, VehicleClass::Car, Direction::Southbound));
        }
        state
    }

    //=====================================================================
    // Transitions
    //=====================================================================

    #[test]
    fn one_sided_demand_claims_exclusive_access() {
        let mut state = state_with(&[1, 2], &[]);

        let change = state.rebalance();

        assert!(!state.mixed_use, "south is empty, mixed-use must not open");
        assert!(state.north_active);
        assert!(!state.south_active);
        assert_eq!(
            change,
            Some((TrafficPhase::Idle, TrafficPhase::Exclusive(Direction::Northbound)))
        );
    }

    #[test]
    fn demand_on_both_sides_enters_mixed_use() {
        let mut state = state_with(&[1], &[2]);
        state.north_active = true;

        state.rebalance();

        assert!(state.mixed_use);
        assert!(!state.north_active);
        assert!(!state.south_active);
        assert_eq!(state.phase(), TrafficPhase::Mixed);
    }

    #[test]
    fn drained_mixed_use_hands_bridge_to_remaining_side() {
        let mut state = state_with(&[], &[3, 4]);
        state.mixed_use = true;

        state.rebalance();

        assert!(!state.mixed_use);
        assert!(state.south_active);
        assert!(!state.north_active);
    }

    #[test]
    fn fully_drained_mixed_use_goes_idle() {
        let mut state = state_with(&[], &[]);
        state.mixed_use = true;

        let change = state.rebalance();

        assert!(!state.mixed_use);
        assert!(!state.north_active);
        assert!(!state.south_active);
        assert_eq!(change, Some((TrafficPhase::Mixed, TrafficPhase::Idle)));
    }

    #[test]
    fn blocked_waiter_counts_as_demand() {
        let mut state = state_with(&[1], &[]);
        state.rebalance();
        assert_eq!(state.phase(), TrafficPhase::Exclusive(Direction::Northbound));

        state.take_ticket(Direction::Southbound);
        state.rebalance();

        assert_eq!(state.phase(), TrafficPhase::Mixed);
    }

    #[test]
    fn exclusive_holder_is_not_displaced_without_contention() {
        let mut state = state_with(&[], &[]);
        state.south_active = true;
        state.enqueue(Vehicle::new(9, VehicleClass::Van, Direction::Southbound));

        assert_eq!(state.rebalance(), None);
        assert!(state.south_active);
        assert!(!state.north_active);
    }

    #[test]
    fn idle_without_demand_is_stable() {
        let mut state = state_with(&[], &[]);
        assert_eq!(state.rebalance(), None);
        assert_eq!(state.phase(), TrafficPhase::Idle);
    }

    //=====================================================================
    // Alternation
    //=====================================================================

    #[test]
    fn contention_cycle_serves_both_directions() {
        let mut state = state_with(&[1, 2], &[]);
        state.rebalance();
        assert_eq!(state.phase(), TrafficPhase::Exclusive(Direction::Northbound));

        // Southbound demand shows up while north holds the bridge
        state.take_ticket(Direction::Southbound);
        state.rebalance();
        assert_eq!(state.phase(), TrafficPhase::Mixed);

        // North drains first, south takes over
        for id in [1, 2] {
            let v = Vehicle::new(id, VehicleClass::Car, Direction::Northbound);
            state.begin_crossing(&v);
            state.end_crossing(&v);
        }
        state.rebalance();
        assert_eq!(state.phase(), TrafficPhase::Exclusive(Direction::Southbound));
    }
}
