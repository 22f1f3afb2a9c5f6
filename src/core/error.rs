//=========================================================================
// Bridge Errors
//=========================================================================
//
// Fatal conditions surfaced to callers. Bridge operations themselves
// never fail: they succeed or block. Errors only arise when building a
// bridge, parsing a schedule, or joining vehicle threads.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::vehicle::{VehicleClass, VehicleId};

//=== BridgeError =========================================================

#[derive(Error, Debug)]
pub enum BridgeError {
    /// A vehicle class that could never be admitted by itself.
    #[error("bridge capacity {capacity} cannot carry a {class} weighing {weight}")]
    CapacityTooSmall {
        capacity: u32,
        class: VehicleClass,
        weight: u32,
    },
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("vehicle #{0} thread panicked")]
    VehiclePanicked(VehicleId),
    #[error("reporter thread panicked")]
    ReporterPanicked,
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to read schedule: {0}")]
    Io(#[from] std::io::Error),
}
