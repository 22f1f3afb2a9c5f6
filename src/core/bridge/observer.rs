//=========================================================================
// Bridge Observations
//=========================================================================
//
// Events the bridge produces for reporting, sent over a crossbeam
// channel to whoever drives the simulation.
//
// Architecture:
//   Bridge (critical section) → EventEmitter::emit() → try_send
//                                                         ↓
//   Reporter thread ←──────────────── Receiver<BridgeEvent>
//
// Emission happens under the bridge lock, so it must never block: a
// full channel drops the observation and logs a warning.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Sender, TrySendError};
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::fairness::TrafficPhase;
use crate::core::vehicle::Vehicle;

//=== BridgeEvent =========================================================

/// Observations emitted by bridge operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Vehicle passed the admission gate and joined its pending queue.
    Admitted { vehicle: Vehicle },

    /// Vehicle is on the bridge. `load` includes its own weight.
    CrossingStarted { vehicle: Vehicle, load: u32 },

    /// Vehicle left the bridge. `load` is what remains after it.
    Exited { vehicle: Vehicle, load: u32 },

    /// Fairness policy moved the bridge to a different phase.
    PhaseChanged { from: TrafficPhase, to: TrafficPhase },
}

//=== EventEmitter ========================================================

/// Non-blocking sender for bridge observations.
///
/// A disconnected receiver is tolerated: the bridge keeps operating, it
/// just stops being observed.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventEmitter {
    sender: Option<Sender<BridgeEvent>>,
}

impl EventEmitter {
    pub fn new(sender: Option<Sender<BridgeEvent>>) -> Self {
        Self { sender }
    }

    pub fn emit(&self, event: BridgeEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("Observer channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!("Observer disconnected");
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
