//=========================================================================
// Bridge Control Core
//
// Concurrency core of the bridge: shared state, admission gate,
// crossing, release and fairness policy, plus the vehicle model and
// error types they use.
//
// Responsibilities:
// - Serialise every read and write of the shared bridge state
// - Block arriving vehicles until they may safely proceed
// - Keep the bridge load within capacity
// - Alternate directions so neither starves
//
// Notes:
// The core has no notion of threads, schedules or randomness. Callers
// hand it fully-formed vehicles and drive each one through
// arrive → cross → leave on a thread of their own.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod bridge;
pub mod error;
pub mod vehicle;

//=== Public API ==========================================================

pub use bridge::{Bridge, BridgeBuilder, BridgeEvent, BridgeSnapshot, TrafficPhase};
pub use error::BridgeError;
pub use vehicle::{Direction, Vehicle, VehicleClass, VehicleId};
