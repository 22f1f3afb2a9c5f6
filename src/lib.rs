//=========================================================================
// Bridge Control - Library Root
//
// This crate coordinates vehicles over a single-lane bridge shared by
// two opposing directions under a total-weight limit.
//
// Responsibilities:
// - Expose the concurrency core (`core`): bridge state, admission gate,
//   crossing, release and the direction fairness policy
// - Expose a schedule-driven simulation (`simulation`) that runs one
//   thread per vehicle against a shared bridge
//
// Typical usage:
// ```no_run
// use bridge_control::prelude::*;
//
// let schedule = Schedule::new(vec!["20:0.7:1".parse()?])?;
// let report = SimulationBuilder::new(schedule).build()?.run()?;
// println!("{}", report);
// # Ok::<(), BridgeError>(())
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` is everything a vehicle actor talks to. It never spawns threads
// itself; callers drive each vehicle through arrive → cross → leave.
//
pub mod core;

// `simulation` owns schedules, random vehicle generation, vehicle threads
// and reporting.
//
pub mod simulation;

pub mod prelude;
