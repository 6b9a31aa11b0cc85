//! The two ways of lining customers up for the registers.
//!
//! [`SingleLine`] pools every register into one resource, so whoever is at
//! the head of the line takes the next free register. [`MultiLine`] gives
//! every register its own line, and a customer stays in the line they
//! picked even if another register goes idle.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Acquire, Resource, RoutingPolicy, ShortestQueue, SimError, Snapshot, Ticket};

/// Result of admitting a customer to the registers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Granted { lane: usize, ticket: Ticket },
    Queued { lane: usize, ahead: usize },
}

impl Admission {
    pub fn lane(&self) -> usize {
        match self {
            Admission::Granted { lane, .. } | Admission::Queued { lane, .. } => *lane,
        }
    }
}

pub trait Registers {
    fn request(&mut self, ticket: Ticket) -> Admission;

    /// Release a slot on `lane`, returning the queued ticket that takes it over.
    fn release(&mut self, lane: usize) -> Option<Ticket>;

    /// One snapshot per lane, in lane order.
    fn snapshot(&self) -> Vec<Snapshot>;

    fn waiting(&self) -> usize {
        self.snapshot().iter().map(|s| s.queue_length).sum()
    }

    fn in_service(&self) -> usize {
        self.snapshot().iter().map(|s| s.active_count).sum()
    }
}

/// One shared line feeding `n` registers
#[derive(Debug, Clone)]
pub struct SingleLine {
    register: Resource,
}

impl SingleLine {
    pub fn new(registers: NonZeroUsize) -> Self {
        SingleLine {
            register: Resource::new(registers),
        }
    }
}

impl Registers for SingleLine {
    fn request(&mut self, ticket: Ticket) -> Admission {
        match self.register.request(ticket) {
            Acquire::Granted(ticket) => Admission::Granted { lane: 0, ticket },
            Acquire::Queued { ahead } => Admission::Queued { lane: 0, ahead },
        }
    }

    fn release(&mut self, _lane: usize) -> Option<Ticket> {
        self.register.release()
    }

    fn snapshot(&self) -> Vec<Snapshot> {
        vec![self.register.snapshot()]
    }
}

/// A line per register; arrivals are routed by a [`RoutingPolicy`]
pub struct MultiLine {
    lanes: Vec<Resource>,
    routing: Box<dyn RoutingPolicy>,
}

impl MultiLine {
    pub fn new(registers: NonZeroUsize) -> Self {
        Self::with_routing(registers, Box::new(ShortestQueue))
    }

    pub fn with_routing(registers: NonZeroUsize, routing: Box<dyn RoutingPolicy>) -> Self {
        MultiLine {
            lanes: (0..registers.get())
                .map(|_| Resource::new(NonZeroUsize::MIN))
                .collect(),
            routing,
        }
    }
}

impl Registers for MultiLine {
    /// # Panics
    ///
    /// If the routing policy picks a lane that does not exist.
    fn request(&mut self, ticket: Ticket) -> Admission {
        let lane = self.routing.choose(&self.snapshot());
        match self.lanes[lane].request(ticket) {
            Acquire::Granted(ticket) => Admission::Granted { lane, ticket },
            Acquire::Queued { ahead } => Admission::Queued { lane, ahead },
        }
    }

    fn release(&mut self, lane: usize) -> Option<Ticket> {
        self.lanes.get_mut(lane).and_then(Resource::release)
    }

    fn snapshot(&self) -> Vec<Snapshot> {
        self.lanes.iter().map(Resource::snapshot).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    SingleLine,
    MultiLine,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::SingleLine, Discipline::MultiLine];

    pub fn registers(self, count: NonZeroUsize) -> Box<dyn Registers> {
        match self {
            Discipline::SingleLine => Box::new(SingleLine::new(count)),
            Discipline::MultiLine => Box::new(MultiLine::new(count)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Discipline::SingleLine => "single-line",
            Discipline::MultiLine => "multi-line",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Discipline {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-line" | "single" => Ok(Discipline::SingleLine),
            "multi-line" | "multi" => Ok(Discipline::MultiLine),
            other => Err(SimError::invalid(format!("unknown discipline '{}'", other))),
        }
    }
}
