//=========================================================================
// Traffic Reporter
//=========================================================================
//
// Consumes bridge observations on a dedicated thread and folds them into
// a TrafficReport. Also formats queue snapshots for the vehicle routine.
//
// Architecture:
//   Bridge ──BridgeEvent──► Receiver ──► Reporter::run() ──► TrafficReport
//
// The reporter exits when told to shut down (after draining whatever is
// still buffered) or once every sender is gone.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use crossbeam_channel::{select, Receiver};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::{BridgeEvent, BridgeSnapshot, Direction, TrafficPhase, VehicleId};

//=== TrafficReport =======================================================

/// Summary of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficReport {
    pub admitted: usize,
    pub crossed_north: usize,
    pub crossed_south: usize,
    /// Vehicle ids in the order they started crossing.
    pub crossing_order: Vec<VehicleId>,
    /// Highest bridge load observed.
    pub peak_load: u32,
    pub phase_changes: usize,
    pub mixed_use_entries: usize,
}

impl TrafficReport {
    pub fn crossed(&self) -> usize {
        self.crossed_north + self.crossed_south
    }

    fn record(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Admitted { .. } => self.admitted += 1,
            BridgeEvent::CrossingStarted { vehicle, load } => {
                self.crossing_order.push(vehicle.id);
                self.peak_load = self.peak_load.max(*load);
            }
            BridgeEvent::Exited { vehicle, .. } => match vehicle.direction {
                Direction::Northbound => self.crossed_north += 1,
                Direction::Southbound => self.crossed_south += 1,
            },
            BridgeEvent::PhaseChanged { to, .. } => {
                self.phase_changes += 1;
                if *to == TrafficPhase::Mixed {
                    self.mixed_use_entries += 1;
                }
            }
        }
    }
}

impl fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vehicles admitted:   {}", self.admitted)?;
        writeln!(f, "Crossed northbound:  {}", self.crossed_north)?;
        writeln!(f, "Crossed southbound:  {}", self.crossed_south)?;
        writeln!(f, "Peak bridge load:    {}", self.peak_load)?;
        writeln!(f, "Phase changes:       {}", self.phase_changes)?;
        write!(f, "Mixed-use windows:   {}", self.mixed_use_entries)
    }
}

//=== Reporter ============================================================

pub(crate) struct Reporter {
    receiver: Receiver<BridgeEvent>,
    report: TrafficReport,
}

impl Reporter {
    pub fn new(receiver: Receiver<BridgeEvent>) -> Self {
        Self {
            receiver,
            report: TrafficReport::default(),
        }
    }

    /// Folds observations into the report until `shutdown` fires (a
    /// message or disconnect) or every event sender disconnects.
    pub fn run(self, shutdown: Receiver<()>) -> TrafficReport {
        let Reporter { receiver, mut report } = self;

        loop {
            select! {
                recv(receiver) -> msg => match msg {
                    Ok(event) => handle_event(&mut report, event),
                    Err(_) => break,
                },
                recv(shutdown) -> _ => {
                    for event in receiver.try_iter() {
                        handle_event(&mut report, event);
                    }
                    break;
                }
            }
        }

        info!(target: "reporter", "Reporter stopped after {} crossings", report.crossed());
        report
    }
}

fn handle_event(report: &mut TrafficReport, event: BridgeEvent) {
    match &event {
        BridgeEvent::PhaseChanged { from, to } => {
            info!(target: "reporter", "Traffic phase {} -> {}", from, to)
        }
        other => debug!(target: "reporter", "{:?}", other),
    }
    report.record(&event);
}

//=== Queue Formatting ====================================================

/// Queue sizes, as logged after every vehicle step.
pub struct QueueStatus<'a>(pub &'a BridgeSnapshot);

impl fmt::Display for QueueStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "queues N:{} S:{} | waiting N:{} S:{} | load {}/{}",
            s.north_queue.len(),
            s.south_queue.len(),
            s.waiting_north,
            s.waiting_south,
            s.on_bridge_weight,
            s.capacity
        )
    }
}

/// Queue contents, one vehicle per line.
pub struct TrafficFlow<'a>(pub &'a BridgeSnapshot);

impl fmt::Display for TrafficFlow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, queue) in [
            ("Northbound", &self.0.north_queue),
            ("Southbound", &self.0.south_queue),
        ] {
            writeln!(f, "{} queue:", name)?;
            if queue.is_empty() {
                writeln!(f, "  (empty)")?;
            }
            for vehicle in queue {
                writeln!(f, "  {}", vehicle)?;
            }
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
