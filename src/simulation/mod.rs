//=========================================================================
// Simulation Driver
//
// Drives vehicles over a shared bridge according to an arrival schedule.
//
// Architecture:
// ```text
//     SimulationBuilder  ──build()──>  Simulation  ──run()──>  TrafficReport
//         │                               │
//         ├─ with_seed()                  ├─ reporter thread (BridgeEvent rx)
//         ├─ with_max_arrival_jitter()    ├─ rebalance timer (optional)
//         ├─ with_rebalance_interval()    └─ one thread per vehicle:
//         └─ with_bridge()                     jitter → arrive → cross → leave
// ```
//
// Groups are released in schedule order with the group's delay between
// them. All vehicle threads are joined before the report is produced.
//
//=========================================================================

//=== Module Declarations =================================================

mod generator;
mod reporter;
mod schedule;

//=== Public API ==========================================================

pub use generator::VehicleGenerator;
pub use reporter::{QueueStatus, TrafficFlow, TrafficReport};
pub use schedule::{Schedule, VehicleGroup};

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use crate::core::{Bridge, BridgeBuilder, BridgeError, BridgeEvent, Vehicle, VehicleId};
use reporter::Reporter;

//=== SimulationBuilder ===================================================

/// Builder for configuring and constructing a [`Simulation`].
///
/// # Default Values
///
/// - **Seed**: none (entropy)
/// - **Max arrival jitter**: 4 seconds
/// - **Rebalance interval**: none (policy only runs on state changes)
/// - **Event channel capacity**: 1024 observations
/// - **Bridge**: [`BridgeBuilder::new`] defaults
///
/// # Examples
///
/// ```no_run
/// use bridge_control::prelude::*;
///
/// let schedule = Schedule::new(vec!["10:0.7:2".parse()?, "5:0.2:0".parse()?])?;
/// let report = SimulationBuilder::new(schedule)
///     .with_seed(7)
///     .build()?
///     .run()?;
/// println!("{}", report);
/// # Ok::<(), BridgeError>(())
/// ```
pub struct SimulationBuilder {
    schedule: Schedule,
    seed: Option<u64>,
    max_arrival_jitter: Duration,
    rebalance_interval: Option<Duration>,
    channel_capacity: usize,
    bridge: BridgeBuilder,
}

impl SimulationBuilder {
    /// Creates a new builder for `schedule` with default settings.
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            seed: None,
            max_arrival_jitter: Duration::from_secs(4),
            rebalance_interval: None,
            channel_capacity: 1024,
            bridge: BridgeBuilder::new(),
        }
    }

    /// Makes vehicle attributes and arrival jitter reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the upper bound of the random delay before each arrival.
    pub fn with_max_arrival_jitter(mut self, jitter: Duration) -> Self {
        self.max_arrival_jitter = jitter;
        self
    }

    /// Also runs the fairness policy on a fixed timer.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn with_rebalance_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "Rebalance interval must be positive");
        self.rebalance_interval = Some(interval);
        self
    }

    /// Sets the capacity of the observation channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Configures the bridge. Its observer is replaced by the reporter.
    pub fn with_bridge(mut self, bridge: BridgeBuilder) -> Self {
        self.bridge = bridge;
        self
    }

    /// Builds the bridge and wires its observations to a reporter.
    ///
    /// # Errors
    ///
    /// Whatever [`BridgeBuilder::build`] rejects.
    pub fn build(self) -> Result<Simulation, BridgeError> {
        let (tx, rx) = bounded(self.channel_capacity);
        let bridge = self.bridge.with_observer(tx).build()?;

        info!(
            "Simulation ready ({} groups, {} vehicles, seed: {:?})",
            self.schedule.groups().len(),
            self.schedule.total_vehicles(),
            self.seed
        );

        Ok(Simulation {
            bridge: Arc::new(bridge),
            events: rx,
            schedule: self.schedule,
            generator: VehicleGenerator::new(self.seed),
            max_arrival_jitter: self.max_arrival_jitter,
            rebalance_interval: self.rebalance_interval,
        })
    }
}

//=== Simulation ==========================================================

/// A configured run: a bridge, a schedule and the vehicles it releases.
pub struct Simulation {
    bridge: Arc<Bridge>,
    events: Receiver<BridgeEvent>,
    schedule: Schedule,
    generator: VehicleGenerator,
    max_arrival_jitter: Duration,
    rebalance_interval: Option<Duration>,
}

impl Simulation {
    /// Shared handle to the bridge, e.g. for snapshots while running.
    pub fn bridge(&self) -> Arc<Bridge> {
        Arc::clone(&self.bridge)
    }

    /// Releases every scheduled vehicle and blocks until all have left.
    ///
    /// # Lifecycle
    ///
    /// 1. Spawns the reporter (and the rebalance timer if configured)
    /// 2. Releases each group, one thread per vehicle, then sleeps the
    ///    group's delay
    /// 3. Joins every vehicle thread
    /// 4. Logs remaining queue contents and stops the helpers
    ///
    /// # Errors
    ///
    /// [`BridgeError::Spawn`] if a thread cannot be created,
    /// [`BridgeError::VehiclePanicked`] / [`BridgeError::ReporterPanicked`]
    /// if a thread panicked.
    pub fn run(self) -> Result<TrafficReport, BridgeError> {
        let Simulation {
            bridge,
            events,
            schedule,
            mut generator,
            max_arrival_jitter,
            rebalance_interval,
        } = self;

        info!("Starting simulation");

        //--- 1. Helpers ---------------------------------------------------
        let (reporter_stop, reporter_shutdown) = bounded::<()>(1);
        let reporter = thread::Builder::new()
            .name("reporter".into())
            .spawn(move || Reporter::new(events).run(reporter_shutdown))
            .map_err(BridgeError::Spawn)?;

        let timer = rebalance_interval
            .map(|interval| spawn_rebalance_timer(Arc::clone(&bridge), interval))
            .transpose()?;

        //--- 2. Release groups --------------------------------------------
        let mut vehicles: Vec<(VehicleId, JoinHandle<()>)> = Vec::new();

        for (index, group) in schedule.groups().iter().enumerate() {
            info!(
                "Releasing group {} ({} vehicles, {:.0}% northbound)",
                index + 1,
                group.vehicles,
                group.north_probability * 100.0
            );

            for _ in 0..group.vehicles {
                let vehicle = generator.next_vehicle(group);
                let jitter = generator.arrival_jitter(max_arrival_jitter);
                let handle = spawn_vehicle(Arc::clone(&bridge), vehicle, jitter)?;
                vehicles.push((vehicle.id, handle));
            }

            if !group.delay.is_zero() {
                thread::sleep(group.delay);
            }
        }

        //--- 3. Join vehicles ---------------------------------------------
        let mut failure = None;
        for (id, handle) in vehicles {
            if handle.join().is_err() {
                error!("Vehicle #{} thread panicked", id);
                if failure.is_none() {
                    failure = Some(BridgeError::VehiclePanicked(id));
                }
            }
        }

        //--- 4. Shutdown --------------------------------------------------
        let snapshot = bridge.snapshot();
        info!("Final traffic flow:\n{}", TrafficFlow(&snapshot));

        if let Some((stop, handle)) = timer {
            drop(stop);
            if handle.join().is_err() {
                error!("Rebalance timer panicked");
            }
        }

        // Every observation was emitted before its vehicle thread returned
        drop(reporter_stop);
        let report = reporter.join().map_err(|_| BridgeError::ReporterPanicked)?;

        match failure {
            Some(err) => Err(err),
            None => {
                info!("Simulation complete ({} crossings)", report.crossed());
                Ok(report)
            }
        }
    }
}

//=== Vehicle Routine =====================================================

fn spawn_vehicle(
    bridge: Arc<Bridge>,
    vehicle: Vehicle,
    jitter: Duration,
) -> Result<JoinHandle<()>, BridgeError> {
    thread::Builder::new()
        .name(format!("vehicle-{}", vehicle.id))
        .spawn(move || {
            if !jitter.is_zero() {
                thread::sleep(jitter);
            }
            debug!("{} arriving", vehicle);

            bridge.arrive(vehicle);
            info!("{} arrived | {}", vehicle, QueueStatus(&bridge.snapshot()));

            bridge.cross(vehicle);
            info!("{} crossed | {}", vehicle, QueueStatus(&bridge.snapshot()));

            bridge.leave(vehicle);
            info!("{} left | {}", vehicle, QueueStatus(&bridge.snapshot()));
        })
        .map_err(BridgeError::Spawn)
}

//=== Rebalance Timer =====================================================

/// Runs the fairness policy every `interval` until the returned sender
/// is dropped.
fn spawn_rebalance_timer(
    bridge: Arc<Bridge>,
    interval: Duration,
) -> Result<(Sender<()>, JoinHandle<()>), BridgeError> {
    let (stop_tx, stop_rx) = bounded::<()>(1);

    let handle = thread::Builder::new()
        .name("rebalance-timer".into())
        .spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => bridge.rebalance(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("Rebalance timer stopping");
                    break;
                }
            }
        })
        .map_err(BridgeError::Spawn)?;

    Ok((stop_tx, handle))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(groups: &[&str]) -> Schedule {
        Schedule::new(groups.iter().map(|g| g.parse().unwrap()).collect()).unwrap()
    }

    fn quick(schedule: Schedule) -> SimulationBuilder {
        SimulationBuilder::new(schedule)
            .with_seed(11)
            .with_max_arrival_jitter(Duration::from_millis(5))
            .with_bridge(BridgeBuilder::new().with_crossing_time(Duration::from_millis(2)))
    }

    //=====================================================================
    // SimulationBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = SimulationBuilder::new(schedule(&["1:0.5:0"]));
        assert_eq!(builder.seed, None);
        assert_eq!(builder.max_arrival_jitter, Duration::from_secs(4));
        assert_eq!(builder.rebalance_interval, None);
        assert_eq!(builder.channel_capacity, 1024);
    }

    #[test]
    #[should_panic(expected = "Rebalance interval must be positive")]
    fn builder_rejects_zero_rebalance_interval() {
        SimulationBuilder::new(schedule(&["1:0.5:0"])).with_rebalance_interval(Duration::ZERO);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_rejects_zero_channel_capacity() {
        SimulationBuilder::new(schedule(&["1:0.5:0"])).with_channel_capacity(0);
    }

    #[test]
    fn build_propagates_bridge_errors() {
        let result = SimulationBuilder::new(schedule(&["1:0.5:0"]))
            .with_bridge(BridgeBuilder::new().with_capacity(100))
            .build();
        assert!(matches!(result, Err(BridgeError::CapacityTooSmall { .. })));
    }

    //=====================================================================
    // Runs
    //=====================================================================

    #[test]
    fn every_vehicle_crosses_exactly_once() {
        let report = quick(schedule(&["12:0.7:0.01", "8:0.2:0"]))
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.admitted, 20);
        assert_eq!(report.crossed(), 20);

        let mut order = report.crossing_order.clone();
        order.sort_unstable();
        assert_eq!(order, (1..=20).collect::<Vec<_>>());
        assert!(report.peak_load <= 1200);
    }

    #[test]
    fn one_way_traffic_never_mixes() {
        let report = quick(schedule(&["10:1:0"])).build().unwrap().run().unwrap();

        assert_eq!(report.crossed_north, 10);
        assert_eq!(report.crossed_south, 0);
        assert_eq!(report.mixed_use_entries, 0);
    }

    #[test]
    fn timer_driven_rebalance_completes() {
        let simulation = quick(schedule(&["6:0.5:0"]))
            .with_rebalance_interval(Duration::from_millis(1))
            .build()
            .unwrap();
        let bridge = simulation.bridge();

        let report = simulation.run().unwrap();

        assert_eq!(report.crossed(), 6);
        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.on_bridge_weight, 0);
        assert!(snapshot.north_queue.is_empty() && snapshot.south_queue.is_empty());
    }
}
