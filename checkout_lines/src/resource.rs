use std::collections::VecDeque;
use std::num::NonZeroUsize;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Customer, SimError};

/// A pending or granted request for a register slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticket {
    pub customer: Customer,
    pub requested_at: f64,
}

/// Outcome of a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acquire {
    Granted(Ticket),
    /// Queued behind `ahead` other requests
    Queued { ahead: usize },
}

/// Non-suspending view of a resource used for routing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub queue_length: usize,
    pub active_count: usize,
    pub capacity: usize,
}

impl Snapshot {
    /// Work currently assigned: waiting plus being served
    pub fn load(&self) -> usize {
        self.queue_length + self.active_count
    }
}

/// Bounded-capacity resource with a FIFO wait queue.
///
/// A request is granted immediately iff a slot is free. Otherwise it joins
/// the back of the queue and is granted in arrival order as slots free up.
#[derive(Debug, Clone)]
pub struct Resource {
    capacity: usize,
    active_count: usize,
    wait_queue: VecDeque<Ticket>,
}

impl Resource {
    pub fn new(capacity: NonZeroUsize) -> Resource {
        Resource {
            capacity: capacity.get(),
            active_count: 0,
            wait_queue: VecDeque::new(),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Resource, SimError> {
        NonZeroUsize::new(capacity)
            .map(Resource::new)
            .ok_or_else(|| SimError::invalid("resource capacity must be positive"))
    }

    pub fn request(&mut self, ticket: Ticket) -> Acquire {
        if self.active_count < self.capacity {
            self.active_count += 1;
            Acquire::Granted(ticket)
        } else {
            let ahead = self.wait_queue.len();
            self.wait_queue.push_back(ticket);
            Acquire::Queued { ahead }
        }
    }

    /// Free one slot and hand it straight to the head of the queue, if any.
    ///
    /// Returns the ticket that now holds the freed slot.
    pub fn release(&mut self) -> Option<Ticket> {
        if self.active_count == 0 {
            warn!("release on an idle resource ignored");
            return None;
        }
        self.active_count -= 1;

        let next = self.wait_queue.pop_front()?;
        self.active_count += 1;
        Some(next)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn queue_length(&self) -> usize {
        self.wait_queue.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            queue_length: self.wait_queue.len(),
            active_count: self.active_count,
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: usize, requested_at: f64) -> Ticket {
        Ticket {
            customer: Customer::new(id, 4),
            requested_at,
        }
    }

    fn resource(capacity: usize) -> Resource {
        Resource::try_new(capacity).unwrap()
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            Resource::try_new(0),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn granted_while_capacity_remains() {
        let mut register = resource(2);

        assert_eq!(register.request(ticket(0, 0.0)), Acquire::Granted(ticket(0, 0.0)));
        assert_eq!(register.request(ticket(1, 0.0)), Acquire::Granted(ticket(1, 0.0)));
        assert_eq!(register.request(ticket(2, 1.0)), Acquire::Queued { ahead: 0 });
        assert_eq!(register.request(ticket(3, 2.0)), Acquire::Queued { ahead: 1 });

        assert_eq!(
            register.snapshot(),
            Snapshot {
                queue_length: 2,
                active_count: 2,
                capacity: 2,
            }
        );
        assert_eq!(register.snapshot().load(), 4);
    }

    #[test]
    fn release_hands_slot_to_queue_head() {
        let mut register = resource(1);
        register.request(ticket(0, 0.0));
        register.request(ticket(1, 1.0));
        register.request(ticket(2, 2.0));

        assert_eq!(register.release(), Some(ticket(1, 1.0)));
        assert_eq!(register.active_count(), 1);
        assert_eq!(register.queue_length(), 1);

        assert_eq!(register.release(), Some(ticket(2, 2.0)));
        assert_eq!(register.release(), None);
        assert_eq!(register.active_count(), 0);
    }

    #[test]
    fn idle_release_is_ignored() {
        let mut register = resource(3);
        assert_eq!(register.release(), None);
        assert_eq!(register.active_count(), 0);
    }

    #[test]
    fn active_count_never_exceeds_capacity() {
        let mut register = resource(3);
        for i in 0..50 {
            register.request(ticket(i, i as f64));
            assert!(register.active_count() <= register.capacity());
            if i % 3 == 0 {
                register.release();
            }
            assert!(register.active_count() <= register.capacity());
        }
    }
}
