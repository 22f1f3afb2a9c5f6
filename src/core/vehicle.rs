//=========================================================================
// Vehicle Model
//=========================================================================
//
// Value types describing a vehicle passing over the bridge.
//
// A vehicle carries no mutable state inside the core: it is created by
// the driver and passed by value through Arrive → Cross → Leave.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Direction ===========================================================

/// Travel direction across the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Northbound,
    Southbound,
}

impl Direction {
    /// Returns the direction travelling against this one.
    pub fn opposite(self) -> Self {
        match self {
            Self::Northbound => Self::Southbound,
            Self::Southbound => Self::Northbound,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Northbound => write!(f, "northbound"),
            Self::Southbound => write!(f, "southbound"),
        }
    }
}

//=== VehicleClass ========================================================

/// Vehicle class. Determines the weight a vehicle puts on the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Car,
    Van,
}

impl VehicleClass {
    /// Every class, heaviest last.
    pub const ALL: [VehicleClass; 2] = [VehicleClass::Car, VehicleClass::Van];

    /// Weight contributed to the bridge load while crossing.
    pub const fn weight(self) -> u32 {
        match self {
            Self::Car => 200,
            Self::Van => 300,
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Car => write!(f, "Car"),
            Self::Van => write!(f, "Van"),
        }
    }
}

//=== Vehicle =============================================================

/// Identifier unique within one simulation run.
pub type VehicleId = u32;

/// A vehicle descriptor as handed to the bridge by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vehicle {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub direction: Direction,
}

impl Vehicle {
    pub fn new(id: VehicleId, class: VehicleClass, direction: Direction) -> Self {
        Self { id, class, direction }
    }

    /// Shorthand for `self.class.weight()`.
    pub fn weight(&self) -> u32 {
        self.class.weight()
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} ({})", self.class, self.id, self.direction)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
