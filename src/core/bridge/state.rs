//=========================================================================
// Bridge State
//=========================================================================
//
// Shared data behind the bridge-wide lock.
//
// Layout:
//   BridgeState
//     ├─ north / south:      PendingQueue (admitted, not yet crossing)
//     ├─ on_bridge_weight:   load of vehicles currently crossing
//     ├─ crossing_*:         vehicles currently crossing, per direction
//     ├─ north/south_active: exclusive access flags (set by fairness)
//     ├─ mixed_use:          both directions may feed the bridge
//     └─ north/south_line:   gate tickets, FIFO among blocked arrivals
//
// Invariants (checked in debug builds after every mutation):
//   - on_bridge_weight + pending weights <= capacity
//   - north_active && south_active  =>  mixed_use
//
// Nothing here locks or blocks. `Bridge` owns the lock and the
// condition variables and calls into this type from its critical
// sections.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::pending_queue::PendingQueue;
use crate::core::vehicle::{Direction, Vehicle, VehicleId};

//=== BridgeSnapshot ======================================================

/// Read-only copy of the bridge state, taken under the bridge lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSnapshot {
    /// Northbound vehicles admitted but not yet crossing, in FIFO order.
    pub north_queue: Vec<Vehicle>,
    /// Southbound vehicles admitted but not yet crossing, in FIFO order.
    pub south_queue: Vec<Vehicle>,
    pub on_bridge_weight: u32,
    pub capacity: u32,
    pub crossing_north: usize,
    pub crossing_south: usize,
    pub north_active: bool,
    pub south_active: bool,
    pub mixed_use: bool,
    pub waiting_north: usize,
    pub waiting_south: usize,
}

impl BridgeSnapshot {
    pub fn pending(&self, direction: Direction) -> usize {
        match direction {
            Direction::Northbound => self.north_queue.len(),
            Direction::Southbound => self.south_queue.len(),
        }
    }
}

//=== GateLine ============================================================

/// Ticket counter giving blocked arrivals of one direction a FIFO order.
///
/// Arrivals holding tickets in `now_serving..next_ticket` have not yet
/// been admitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GateLine {
    next_ticket: u64,
    now_serving: u64,
}

/// Position of an arrival in its direction's gate line.
pub(crate) type Ticket = u64;

impl GateLine {
    fn take(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn advance(&mut self) {
        self.now_serving += 1;
    }

    fn is_turn(&self, ticket: Ticket) -> bool {
        ticket == self.now_serving
    }

    fn waiting(&self) -> usize {
        self.next_ticket.saturating_sub(self.now_serving) as usize
    }
}

//=== BridgeState =========================================================

#[derive(Debug)]
pub(crate) struct BridgeState {
    pub(crate) north: PendingQueue,
    pub(crate) south: PendingQueue,
    pub(crate) on_bridge_weight: u32,
    pub(crate) capacity: u32,
    pub(crate) crossing_north: usize,
    pub(crate) crossing_south: usize,
    pub(crate) north_active: bool,
    pub(crate) south_active: bool,
    pub(crate) mixed_use: bool,
    pub(crate) north_line: GateLine,
    pub(crate) south_line: GateLine,
}

impl BridgeState {
    //--- Construction -----------------------------------------------------

    pub fn new(capacity: u32, queue_capacity: usize) -> Self {
        Self {
            north: PendingQueue::new(queue_capacity),
            south: PendingQueue::new(queue_capacity),
            on_bridge_weight: 0,
            capacity,
            crossing_north: 0,
            crossing_south: 0,
            north_active: false,
            south_active: false,
            mixed_use: false,
            north_line: GateLine::default(),
            south_line: GateLine::default(),
        }
    }

    //--- Per-direction Accessors ------------------------------------------

    pub fn pending(&self, direction: Direction) -> &PendingQueue {
        match direction {
            Direction::Northbound => &self.north,
            Direction::Southbound => &self.south,
        }
    }

    fn pending_mut(&mut self, direction: Direction) -> &mut PendingQueue {
        match direction {
            Direction::Northbound => &mut self.north,
            Direction::Southbound => &mut self.south,
        }
    }

    pub fn is_active(&self, direction: Direction) -> bool {
        match direction {
            Direction::Northbound => self.north_active,
            Direction::Southbound => self.south_active,
        }
    }

    pub fn set_active(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Northbound => self.north_active = active,
            Direction::Southbound => self.south_active = active,
        }
    }

    /// Vehicles of `direction` currently on the bridge.
    pub fn crossing(&self, direction: Direction) -> usize {
        match direction {
            Direction::Northbound => self.crossing_north,
            Direction::Southbound => self.crossing_south,
        }
    }

    fn crossing_mut(&mut self, direction: Direction) -> &mut usize {
        match direction {
            Direction::Northbound => &mut self.crossing_north,
            Direction::Southbound => &mut self.crossing_south,
        }
    }

    fn line(&self, direction: Direction) -> &GateLine {
        match direction {
            Direction::Northbound => &self.north_line,
            Direction::Southbound => &self.south_line,
        }
    }

    fn line_mut(&mut self, direction: Direction) -> &mut GateLine {
        match direction {
            Direction::Northbound => &mut self.north_line,
            Direction::Southbound => &mut self.south_line,
        }
    }

    /// Arrivals in `direction` holding a ticket but not yet admitted.
    pub fn waiting(&self, direction: Direction) -> usize {
        self.line(direction).waiting()
    }

    /// Vehicles that want to use the bridge in `direction`: those already
    /// admitted plus those still blocked at the gate.
    pub fn demand(&self, direction: Direction) -> usize {
        self.pending(direction).len() + self.waiting(direction)
    }

    //--- Admission --------------------------------------------------------

    /// Load on the bridge plus load admitted but not yet crossing.
    pub fn committed_load(&self) -> u32 {
        self.on_bridge_weight + self.north.weight() + self.south.weight()
    }

    /// Places an arriving vehicle at the back of its gate line.
    pub fn take_ticket(&mut self, direction: Direction) -> Ticket {
        self.line_mut(direction).take()
    }

    /// Admission predicate for the holder of `ticket`.
    pub fn may_admit(&self, vehicle: &Vehicle, ticket: Ticket) -> bool {
        self.line(vehicle.direction).is_turn(ticket) && self.has_room_for(vehicle)
    }

    /// Admission predicate ignoring gate-line order.
    pub fn has_room_for(&self, vehicle: &Vehicle) -> bool {
        let direction_open = self.mixed_use || !self.is_active(vehicle.direction.opposite());
        let has_room = self.committed_load() + vehicle.weight() <= self.capacity;
        let has_slot = !self.pending(vehicle.direction).is_full();

        direction_open && has_room && has_slot
    }

    /// Admits the vehicle holding the current ticket and serves the next
    /// one in its gate line.
    pub fn admit(&mut self, vehicle: Vehicle) {
        self.line_mut(vehicle.direction).advance();
        self.enqueue(vehicle);
    }

    /// Appends a vehicle to its direction's pending queue.
    pub fn enqueue(&mut self, vehicle: Vehicle) {
        self.pending_mut(vehicle.direction).push(vehicle);
        self.debug_check_invariants();
    }

    //--- Crossing ---------------------------------------------------------

    /// Moves a vehicle from its pending queue onto the bridge.
    ///
    /// Returns `Some(true)` if the vehicle was the head of its queue,
    /// `Some(false)` if it overtook someone, and `None` if it was never
    /// admitted, in which case the state is left untouched.
    pub fn begin_crossing(&mut self, vehicle: &Vehicle) -> Option<bool> {
        let (_, was_head) = self.pending_mut(vehicle.direction).remove(vehicle.id)?;
        self.on_bridge_weight += vehicle.weight();
        *self.crossing_mut(vehicle.direction) += 1;
        self.debug_check_invariants();
        Some(was_head)
    }

    /// Removes a vehicle's weight from the bridge.
    pub fn end_crossing(&mut self, vehicle: &Vehicle) {
        self.on_bridge_weight = self.on_bridge_weight.saturating_sub(vehicle.weight());
        let crossing = self.crossing_mut(vehicle.direction);
        *crossing = crossing.saturating_sub(1);
        self.debug_check_invariants();
    }

    //--- Queries ----------------------------------------------------------

    pub fn head_of(&self, direction: Direction) -> Option<VehicleId> {
        self.pending(direction).front().map(|v| v.id)
    }

    /// True when nothing is crossing and no direction holds the bridge.
    pub fn is_idle(&self) -> bool {
        self.on_bridge_weight == 0 && !self.north_active && !self.south_active
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot {
            north_queue: self.north.iter().copied().collect(),
            south_queue: self.south.iter().copied().collect(),
            on_bridge_weight: self.on_bridge_weight,
            capacity: self.capacity,
            crossing_north: self.crossing_north,
            crossing_south: self.crossing_south,
            north_active: self.north_active,
            south_active: self.south_active,
            mixed_use: self.mixed_use,
            waiting_north: self.waiting(Direction::Northbound),
            waiting_south: self.waiting(Direction::Southbound),
        }
    }

    //--- Invariants -------------------------------------------------------

    pub(crate) fn debug_check_invariants(&self) {
        debug_assert!(
            self.committed_load() <= self.capacity,
            "committed load {} exceeds capacity {}",
            self.committed_load(),
            self.capacity
        );
        debug_assert!(
            !(self.north_active && self.south_active) || self.mixed_use,
            "both directions active outside mixed-use"
        );
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vehicle::VehicleClass;

    fn vehicle(id: VehicleId, class: VehicleClass, direction: Direction) -> Vehicle {
        Vehicle::new(id, class, direction)
    }

    #[test]
    fn new_state_is_idle() {
        let state = BridgeState::new(1200, 100);
        assert!(state.is_idle());
        assert_eq!(state.committed_load(), 0);
        assert!(!state.mixed_use);
    }

    #[test]
    fn same_direction_vehicles_share_the_bridge() {
        let mut state = BridgeState::new(1200, 100);
        let a = vehicle(1, VehicleClass::Car, Direction::Northbound);
        let b = vehicle(2, VehicleClass::Car, Direction::Northbound);
        let c = vehicle(3, VehicleClass::Van, Direction::Northbound);

        for v in [a, b, c] {
            assert!(state.has_room_for(&v));
            state.enqueue(v);
        }
        state.set_active(Direction::Northbound, true);

        assert_eq!(state.committed_load(), 700);
        let d = vehicle(4, VehicleClass::Van, Direction::Southbound);
        assert!(!state.has_room_for(&d), "southbound must wait for northbound traffic");
    }

    #[test]
    fn mixed_use_opens_opposing_direction() {
        let mut state = BridgeState::new(1200, 100);
        state.set_active(Direction::Northbound, true);
        let v = vehicle(1, VehicleClass::Car, Direction::Southbound);
        assert!(!state.has_room_for(&v));

        state.mixed_use = true;
        assert!(state.has_room_for(&v));
    }

    #[test]
    fn admission_counts_pending_weight() {
        let mut state = BridgeState::new(500, 100);
        state.enqueue(vehicle(1, VehicleClass::Van, Direction::Northbound));

        assert!(state.has_room_for(&vehicle(2, VehicleClass::Car, Direction::Northbound)));
        assert!(!state.has_room_for(&vehicle(3, VehicleClass::Van, Direction::Northbound)));
    }

    #[test]
    fn gate_line_serves_tickets_in_order() {
        let mut state = BridgeState::new(1200, 100);
        let first = vehicle(1, VehicleClass::Van, Direction::Northbound);
        let second = vehicle(2, VehicleClass::Car, Direction::Northbound);
        let t1 = state.take_ticket(Direction::Northbound);
        let t2 = state.take_ticket(Direction::Northbound);

        assert!(state.may_admit(&first, t1));
        assert!(!state.may_admit(&second, t2), "second ticket must wait its turn");

        state.admit(first);
        assert!(state.may_admit(&second, t2));
    }

    #[test]
    fn full_queue_blocks_admission() {
        let mut state = BridgeState::new(1200, 1);
        state.enqueue(vehicle(1, VehicleClass::Car, Direction::Northbound));

        assert!(!state.has_room_for(&vehicle(2, VehicleClass::Car, Direction::Northbound)));
        assert!(state.has_room_for(&vehicle(3, VehicleClass::Car, Direction::Southbound)));
    }

    #[test]
    fn crossing_moves_weight_from_queue_to_bridge() {
        let mut state = BridgeState::new(1200, 100);
        let v = vehicle(1, VehicleClass::Van, Direction::Southbound);
        state.enqueue(v);

        assert_eq!(state.begin_crossing(&v), Some(true));
        assert_eq!(state.on_bridge_weight, 300);
        assert_eq!(state.crossing(Direction::Southbound), 1);
        assert_eq!(state.committed_load(), 300);
        assert!(state.pending(Direction::Southbound).is_empty());

        state.end_crossing(&v);
        assert_eq!(state.on_bridge_weight, 0);
        assert_eq!(state.crossing(Direction::Southbound), 0);
    }

    #[test]
    fn crossing_without_admission_leaves_state_alone() {
        let mut state = BridgeState::new(300, 100);
        let stray = vehicle(9, VehicleClass::Van, Direction::Northbound);

        assert_eq!(state.begin_crossing(&stray), None);
        assert_eq!(state.on_bridge_weight, 0);
        assert_eq!(state.crossing(Direction::Northbound), 0);
    }

    #[test]
    fn demand_includes_blocked_waiters() {
        let mut state = BridgeState::new(1200, 100);
        state.enqueue(vehicle(1, VehicleClass::Car, Direction::Northbound));
        state.take_ticket(Direction::Northbound);
        state.take_ticket(Direction::Southbound);

        assert_eq!(state.demand(Direction::Northbound), 2);
        assert_eq!(state.demand(Direction::Southbound), 1);

        // Admission moves a ticket holder from the gate into the queue
        state.admit(vehicle(2, VehicleClass::Car, Direction::Southbound));
        assert_eq!(state.waiting(Direction::Southbound), 0);
        assert_eq!(state.demand(Direction::Southbound), 1);
    }

    #[test]
    fn snapshot_lists_queues_in_order() {
        let mut state = BridgeState::new(1200, 100);
        state.enqueue(vehicle(5, VehicleClass::Car, Direction::Northbound));
        state.enqueue(vehicle(2, VehicleClass::Van, Direction::Northbound));

        let snapshot = state.snapshot();
        let ids: Vec<_> = snapshot.north_queue.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(snapshot.pending(Direction::Southbound), 0);
        assert_eq!(state.head_of(Direction::Northbound), Some(5));
    }
}
