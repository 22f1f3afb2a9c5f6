//=========================================================================
// Pending Queue
//=========================================================================
//
// Bounded FIFO of vehicles admitted in one direction but not yet on the
// bridge. Arrival order is crossing order.
//
// A full queue is not an error: `Arrive` keeps the caller blocked until
// a slot frees up, so `push` is only called after `is_full()` was false.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

//=== Internal Dependencies ===============================================

use crate::core::vehicle::{Vehicle, VehicleId};

//=== PendingQueue ========================================================

/// Bounded FIFO of admitted vehicles for a single direction.
///
/// Also tracks the summed weight of its contents so the admission gate
/// can account for load that is committed but not yet crossing.
#[derive(Debug)]
pub(crate) struct PendingQueue {
    queue: VecDeque<Vehicle>,
    capacity: usize,
    weight: u32,
}

impl PendingQueue {
    /// Creates an empty queue holding at most `capacity` vehicles.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            weight: 0,
        }
    }

    /// Appends a vehicle at the tail.
    ///
    /// Callers must check `is_full()` first.
    pub fn push(&mut self, vehicle: Vehicle) {
        debug_assert!(!self.is_full(), "push into a full pending queue");
        self.weight += vehicle.weight();
        self.queue.push_back(vehicle);
    }

    /// Removes the vehicle with the given id, normally the head.
    ///
    /// Returns the removed vehicle and whether it was the head.
    pub fn remove(&mut self, id: VehicleId) -> Option<(Vehicle, bool)> {
        let index = self.queue.iter().position(|v| v.id == id)?;
        let vehicle = self.queue.remove(index)?;
        self.weight -= vehicle.weight();
        Some((vehicle, index == 0))
    }

    pub fn front(&self) -> Option<&Vehicle> {
        self.queue.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Summed weight of all queued vehicles.
    pub fn weight(&self) -> u32 {
        self.weight
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vehicle::{Direction, VehicleClass};

    fn car(id: VehicleId) -> Vehicle {
        Vehicle::new(id, VehicleClass::Car, Direction::Northbound)
    }

    fn van(id: VehicleId) -> Vehicle {
        Vehicle::new(id, VehicleClass::Van, Direction::Northbound)
    }

    #[test]
    fn preserves_arrival_order() {
        let mut queue = PendingQueue::new(4);
        queue.push(car(1));
        queue.push(van(2));
        queue.push(car(3));

        let ids: Vec<_> = queue.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(queue.front().map(|v| v.id), Some(1));
    }

    #[test]
    fn tracks_committed_weight() {
        let mut queue = PendingQueue::new(4);
        queue.push(car(1));
        queue.push(van(2));
        assert_eq!(queue.weight(), 500);

        queue.remove(1);
        assert_eq!(queue.weight(), 300);
    }

    #[test]
    fn reports_full_at_capacity() {
        let mut queue = PendingQueue::new(2);
        queue.push(car(1));
        assert!(!queue.is_full());
        queue.push(car(2));
        assert!(queue.is_full());
    }

    #[test]
    fn remove_reports_whether_head() {
        let mut queue = PendingQueue::new(4);
        queue.push(car(1));
        queue.push(car(2));
        queue.push(car(3));

        assert_eq!(queue.remove(2).map(|(v, head)| (v.id, head)), Some((2, false)));
        assert_eq!(queue.remove(1).map(|(v, head)| (v.id, head)), Some((1, true)));
        assert!(queue.remove(99).is_none());
        assert_eq!(queue.len(), 1);
    }
}
