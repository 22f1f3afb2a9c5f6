//=========================================================================
// Vehicle Generator
//=========================================================================
//
// Draws random vehicle attributes for a schedule: direction from the
// group's northbound probability, class with equal odds, and an arrival
// jitter. Ids are handed out sequentially from 1.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use super::schedule::VehicleGroup;
use crate::core::{Direction, Vehicle, VehicleClass, VehicleId};

//=== VehicleGenerator ====================================================

pub struct VehicleGenerator {
    rng: StdRng,
    next_id: VehicleId,
}

impl VehicleGenerator {
    /// Creates a generator; a seed makes the drawn vehicles reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, next_id: 1 }
    }

    /// Draws the next vehicle for `group`.
    pub fn next_vehicle(&mut self, group: &VehicleGroup) -> Vehicle {
        let id = self.next_id;
        self.next_id += 1;

        let direction = if self.rng.gen_bool(group.north_probability) {
            Direction::Northbound
        } else {
            Direction::Southbound
        };
        let class = if self.rng.gen_bool(0.5) {
            VehicleClass::Car
        } else {
            VehicleClass::Van
        };

        Vehicle::new(id, class, direction)
    }

    /// Random delay in `[0, max]` before a vehicle shows up at the gate.
    pub fn arrival_jitter(&mut self, max: Duration) -> Duration {
        let max_ms = max.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(0..=max_ms))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
