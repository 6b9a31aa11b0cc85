//! Single-line versus multi-line checkout simulation.
//!
//! A store with several registers either funnels every customer through one
//! shared line, or gives each register its own line and sends each arrival
//! to the shortest one. Both disciplines are simulated on the `des` event
//! loop and compared by the mean time customers wait before service.

use serde::{Deserialize, Serialize};

// ============================================================================
// Modules
// ============================================================================

pub mod arrival_process;
pub mod config;
pub mod customer;
pub mod error;
pub mod output;
pub mod registers;
pub mod resource;
pub mod routing;
pub mod service;
pub mod store;
pub mod sweep;
pub mod trial;

pub use arrival_process::ArrivalProcess;
pub use config::{Aggregation, ServiceConfig, SimulationConfig, SweepSpec};
pub use customer::{Customer, CustomerGenerator};
pub use error::SimError;
pub use registers::{Admission, Discipline, MultiLine, Registers, SingleLine};
pub use resource::{Acquire, Resource, Snapshot, Ticket};
pub use routing::{RoutingPolicy, ShortestQueue, shortest_queue};
pub use service::{LinearServiceTime, ServiceTime};
pub use store::Store;
pub use sweep::{Comparison, SweepPoint, SweepResult, aggregate, arrival_intervals};
pub use trial::{Experiment, TrialResult, WaitSample};

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone)]
pub enum Event {
    /// Opens the store: the arrival process admits its initial population.
    Start,
    /// Arrival tick: the arrival process books the next customer one interval ahead.
    NextArrival,
    CustomerArrived(Customer),
    ServiceCompleted {
        lane: usize,
        customer: Customer,
        waited: f64,
    },
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone)]
pub enum Stats {
    Store(StoreStats),
    Arrivals(ArrivalStats),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub arrivals: usize,
    pub served: usize,
    /// Customers still waiting in any line when the stats were taken
    pub waiting: usize,
    /// Customers at a register when the stats were taken
    pub in_service: usize,
    /// Most customers waiting across all lines at any instant
    pub peak_waiting: usize,
    pub samples: Vec<WaitSample>,
}

impl StoreStats {
    pub fn total_wait_time(&self) -> f64 {
        self.samples.iter().map(|s| s.elapsed).sum()
    }

    pub fn mean_wait(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.total_wait_time() / self.samples.len() as f64)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalStats {
    pub generated: usize,
}
