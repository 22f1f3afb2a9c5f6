//=========================================================================
// Bridge
//=========================================================================
//
// Shared single-lane bridge: admission gate, crossing, release and the
// fairness policy, all serialised through one bridge-wide lock.
//
// Architecture:
// ```text
//   vehicle thread                 Bridge
//   ──────────────                 ──────────────────────────────────
//   arrive()  ──► lock ─► wait on north_ready / south_ready until
//                         may_admit() ─► admit ─► rebalance
//   cross()   ──► lock ─► move weight queue → bridge ─► unlock ─► sleep
//   leave()   ──► lock ─► remove weight ─► signal ─► rebalance
//
//   rebalance ──► fairness step ─► notify_all (north, south, idle)
// ```
//
// Wait conditions:
// - `north_ready` / `south_ready`: arrivals blocked at the gate
// - `idle`: callers of `wait_until_idle()`
//
// All three are paired with the same mutex so every predicate is read
// inside the critical section that a notifier also holds.
//
//=========================================================================

//=== Module Declarations =================================================

mod fairness;
mod observer;
mod pending_queue;
mod state;

//=== Public API ==========================================================

pub use fairness::TrafficPhase;
pub use observer::BridgeEvent;
pub use state::BridgeSnapshot;

//=== External Dependencies ===============================================

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::BridgeError;
use crate::core::vehicle::{Direction, Vehicle, VehicleClass};
use observer::EventEmitter;
use state::BridgeState;

//=== Defaults ============================================================

/// Maximum combined weight on the bridge.
pub const DEFAULT_CAPACITY: u32 = 1200;

/// Maximum number of admitted vehicles waiting per direction.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Time a vehicle spends on the bridge.
pub const DEFAULT_CROSSING_TIME: Duration = Duration::from_secs(3);

//=== BridgeBuilder =======================================================

/// Builder for configuring and constructing a [`Bridge`].
///
/// # Default Values
///
/// - **Capacity**: 1200
/// - **Queue capacity**: 100 vehicles per direction
/// - **Crossing time**: 3 seconds
/// - **Observer**: none
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bridge_control::prelude::*;
///
/// let bridge = BridgeBuilder::new()
///     .with_crossing_time(Duration::from_millis(10))
///     .build()
///     .expect("default capacity carries every vehicle class");
///
/// let car = Vehicle::new(1, VehicleClass::Car, Direction::Northbound);
/// bridge.arrive(car);
/// bridge.cross(car);
/// bridge.leave(car);
/// assert!(bridge.snapshot().on_bridge_weight == 0);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeBuilder {
    capacity: u32,
    queue_capacity: usize,
    crossing_time: Duration,
    observer: Option<Sender<BridgeEvent>>,
}

impl BridgeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            crossing_time: DEFAULT_CROSSING_TIME,
            observer: None,
        }
    }

    /// Sets the maximum combined weight on the bridge.
    ///
    /// Validated by [`BridgeBuilder::build`]: it must fit the heaviest
    /// vehicle class, otherwise such a vehicle would wait forever.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets how many admitted vehicles may queue per direction.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be positive");
        self.queue_capacity = capacity;
        self
    }

    /// Sets the fixed time every vehicle spends crossing.
    pub fn with_crossing_time(mut self, crossing_time: Duration) -> Self {
        self.crossing_time = crossing_time;
        self
    }

    /// Routes bridge observations to `sender`.
    pub fn with_observer(mut self, sender: Sender<BridgeEvent>) -> Self {
        self.observer = Some(sender);
        self
    }

    /// Builds the bridge.
    ///
    /// # Errors
    ///
    /// [`BridgeError::CapacityTooSmall`] if some vehicle class is heavier
    /// than the whole bridge capacity.
    pub fn build(self) -> Result<Bridge, BridgeError> {
        if let Some(class) = VehicleClass::ALL
            .into_iter()
            .find(|class| class.weight() > self.capacity)
        {
            return Err(BridgeError::CapacityTooSmall {
                capacity: self.capacity,
                class,
                weight: class.weight(),
            });
        }

        info!(
            "Building bridge (capacity: {}, queue: {}, crossing: {:?})",
            self.capacity, self.queue_capacity, self.crossing_time
        );

        Ok(Bridge {
            state: Mutex::new(BridgeState::new(self.capacity, self.queue_capacity)),
            north_ready: Condvar::new(),
            south_ready: Condvar::new(),
            idle: Condvar::new(),
            crossing_time: self.crossing_time,
            emitter: EventEmitter::new(self.observer),
        })
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Bridge ==============================================================

/// Weight-limited single-lane bridge shared by both directions.
///
/// Shared between vehicle threads behind an `Arc`. Each vehicle calls
/// [`arrive`](Bridge::arrive), [`cross`](Bridge::cross) and
/// [`leave`](Bridge::leave) in that order.
///
/// # Guarantees
///
/// - Bridge load never exceeds capacity: admission reserves room for
///   vehicles that are queued but not yet crossing.
/// - Opposing directions share the bridge only during mixed-use.
/// - Within a direction, vehicles are admitted in arrival order.
/// - The fairness policy runs after every admission and release, so a
///   blocked direction forces mixed-use instead of starving.
#[derive(Debug)]
pub struct Bridge {
    state: Mutex<BridgeState>,
    north_ready: Condvar,
    south_ready: Condvar,
    idle: Condvar,
    crossing_time: Duration,
    emitter: EventEmitter,
}

impl Bridge {
    //--- Admission Gate ---------------------------------------------------

    /// Blocks until `vehicle` may join its direction's pending queue, then
    /// enqueues it.
    ///
    /// The vehicle waits while the opposing direction holds the bridge
    /// (outside mixed-use), while its weight does not fit the remaining
    /// capacity, or while its pending queue is full. Every wakeup
    /// re-evaluates the whole predicate.
    pub fn arrive(&self, vehicle: Vehicle) {
        let mut state = self.lock();
        let ticket = state.take_ticket(vehicle.direction);

        if !state.may_admit(&vehicle, ticket) {
            debug!("{} waiting at the gate", vehicle);
            // Blocked demand is visible to the fairness policy
            self.rebalance_locked(&mut state);

            let ready = self.ready(vehicle.direction);
            while !state.may_admit(&vehicle, ticket) {
                state = ready.wait(state).unwrap_or_else(PoisonError::into_inner);
            }
        }

        state.admit(vehicle);
        debug!(
            "{} admitted (committed load: {}/{})",
            vehicle,
            state.committed_load(),
            state.capacity
        );
        self.emitter.emit(BridgeEvent::Admitted { vehicle });

        self.rebalance_locked(&mut state);
    }

    //--- Crossing ---------------------------------------------------------

    /// Puts `vehicle` on the bridge and holds the caller for the crossing
    /// time.
    ///
    /// Must follow [`Bridge::arrive`] for the same vehicle; a vehicle that
    /// is not pending is logged and left off the bridge. The pause happens
    /// after the lock is released.
    pub fn cross(&self, vehicle: Vehicle) {
        {
            let mut state = self.lock();
            let head = state.head_of(vehicle.direction);

            match state.begin_crossing(&vehicle) {
                Some(true) => {}
                Some(false) => debug!("{} overtook vehicle #{:?}", vehicle, head),
                None => {
                    warn!("{} tried to cross without being admitted", vehicle);
                    return;
                }
            }

            let load = state.on_bridge_weight;
            info!("{} is now crossing the bridge (load: {})", vehicle, load);
            self.emitter.emit(BridgeEvent::CrossingStarted { vehicle, load });

            // A pending slot was freed
            self.ready(vehicle.direction).notify_all();
        }

        thread::sleep(self.crossing_time);
    }

    //--- Release ----------------------------------------------------------

    /// Takes `vehicle` off the bridge and wakes whoever may now proceed.
    ///
    /// With more vehicles queued in its direction one gate waiter of that
    /// direction is signalled. Once the direction has nothing queued and
    /// nothing left on the bridge it gives up its active flag, and if the
    /// opposing direction is inactive too the bridge is announced idle.
    ///
    /// The closing rebalance broadcasts to every gate waiter regardless:
    /// a single signal may land on a ticket holder whose turn has not come,
    /// and only the broadcast guarantees the next ticket is rechecked.
    pub fn leave(&self, vehicle: Vehicle) {
        let mut state = self.lock();
        let before = state.phase();
        state.end_crossing(&vehicle);

        let load = state.on_bridge_weight;
        info!("{} exited the bridge (load: {})", vehicle, load);
        self.emitter.emit(BridgeEvent::Exited { vehicle, load });

        let direction = vehicle.direction;
        if !state.pending(direction).is_empty() {
            self.ready(direction).notify_one();
        } else if state.crossing(direction) == 0 {
            state.set_active(direction, false);
            if !state.is_active(direction.opposite()) {
                self.idle.notify_all();
            }
        }

        let after = state.phase();
        if before != after {
            debug!("Traffic phase: {} -> {}", before, after);
            self.emitter.emit(BridgeEvent::PhaseChanged { from: before, to: after });
        }

        self.rebalance_locked(&mut state);
    }

    //--- Fairness ---------------------------------------------------------

    /// Runs the fairness policy and wakes every waiter.
    ///
    /// Bridge operations already do this on every state change; this
    /// entry point is for an external timer.
    pub fn rebalance(&self) {
        let mut state = self.lock();
        self.rebalance_locked(&mut state);
    }

    fn rebalance_locked(&self, state: &mut MutexGuard<'_, BridgeState>) {
        if let Some((from, to)) = state.rebalance() {
            debug!("Traffic phase: {} -> {}", from, to);
            self.emitter.emit(BridgeEvent::PhaseChanged { from, to });
        } else {
            trace!("Traffic phase unchanged: {}", state.phase());
        }

        self.north_ready.notify_all();
        self.south_ready.notify_all();
        self.idle.notify_all();
    }

    //--- Queries ----------------------------------------------------------

    /// Copies the current state under the bridge lock.
    pub fn snapshot(&self) -> BridgeSnapshot {
        self.lock().snapshot()
    }

    /// Current traffic phase.
    pub fn phase(&self) -> TrafficPhase {
        self.lock().phase()
    }

    /// Blocks until no vehicle is crossing and neither direction holds
    /// the bridge.
    pub fn wait_until_idle(&self) {
        let mut state = self.lock();
        while !state.is_idle() {
            state = self.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    //--- Internals --------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        // State invariants hold between critical sections, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready(&self, direction: Direction) -> &Condvar {
        match direction {
            Direction::Northbound => &self.north_ready,
            Direction::Southbound => &self.south_ready,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
