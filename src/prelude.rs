//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types.
//
// Usage:
//   use bridge_control::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Bridge core
pub use crate::core::{
    Bridge, BridgeBuilder, BridgeError, BridgeEvent, BridgeSnapshot, TrafficPhase,
};

// Vehicle model
pub use crate::core::{Direction, Vehicle, VehicleClass, VehicleId};

// Simulation
pub use crate::simulation::{Schedule, Simulation, SimulationBuilder, TrafficReport, VehicleGroup};
