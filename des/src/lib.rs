//! Discrete event simulation core.
//!
//! An [`EventLoop`] owns the simulated clock and a time-ordered queue of
//! pending events. Every dispatched event is broadcast to each [`Agent`],
//! which may answer with new events and new agents via a [`Response`].
//! Events sharing a trigger time are dispatched in the order they were
//! scheduled, so a run is reproducible given seeded agents.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;
use thiserror::Error;

pub mod parallel;

/// Errors raised by the event loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesError {
    /// An event was scheduled before the current simulated time.
    #[error("event scheduled {delay} time units in the past at t={current_t}")]
    NegativeDelay { current_t: f64, delay: f64 },

    /// An event time or delay was NaN or infinite.
    #[error("invalid event time {0}")]
    InvalidTime(f64),
}

struct Event<T> {
    t: f64,
    seq: u64,
    data: T,
}

impl<T> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Event<T> {}

impl<T> Ord for Event<T> {
    // BinaryHeap is a max-heap: earliest time, then lowest seq, must compare greatest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .t
            .total_cmp(&self.t)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What an agent wants to happen after reacting to an event.
///
/// Event times are absolute simulated times and must not precede the time
/// of the event being handled.
pub struct Response<T, S> {
    pub events: Vec<(f64, T)>,
    pub agents: Vec<Box<dyn Agent<T, S>>>,
}

impl<T, S> Response<T, S> {
    pub fn new() -> Response<T, S> {
        Response {
            events: Vec::new(),
            agents: Vec::new(),
        }
    }

    pub fn event(t: f64, data: T) -> Response<T, S> {
        Response {
            events: vec![(t, data)],
            agents: Vec::new(),
        }
    }

    pub fn events(events: Vec<(f64, T)>) -> Response<T, S> {
        Response {
            events,
            agents: Vec::new(),
        }
    }

    pub fn agents(agents: Vec<Box<dyn Agent<T, S>>>) -> Response<T, S> {
        Response {
            events: Vec::new(),
            agents,
        }
    }
}

impl<T, S> Default for Response<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Agent<T, S> {
    fn act(&mut self, _current_t: f64, _data: &T) -> Response<T, S> {
        Response::new()
    }

    fn stats(&self) -> S;
}

pub struct EventLoop<T, S> {
    queue: BinaryHeap<Event<T>>,
    current_t: f64,
    next_seq: u64,
    agents: Vec<Box<dyn Agent<T, S>>>,
}

impl<T, S> EventLoop<T, S> {
    /// Seed a loop with events at absolute times. Ties keep the given order.
    pub fn new(events: Vec<(f64, T)>, agents: Vec<Box<dyn Agent<T, S>>>) -> EventLoop<T, S> {
        let mut event_loop = EventLoop {
            queue: BinaryHeap::with_capacity(events.len()),
            current_t: 0.0,
            next_seq: 0,
            agents,
        };
        for (t, data) in events {
            event_loop.push(t, data);
        }
        event_loop
    }

    pub fn current_t(&self) -> f64 {
        self.current_t
    }

    /// Number of events still waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Schedule `data` to be dispatched `delay` time units from now.
    pub fn schedule_after(&mut self, delay: f64, data: T) -> Result<(), DesError> {
        if !delay.is_finite() {
            return Err(DesError::InvalidTime(delay));
        }
        if delay < 0.0 {
            return Err(DesError::NegativeDelay {
                current_t: self.current_t,
                delay: -delay,
            });
        }
        self.push(self.current_t + delay, data);
        Ok(())
    }

    fn push(&mut self, t: f64, data: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Event { t, seq, data });
    }

    fn check_time(&self, t: f64) -> Result<(), DesError> {
        if !t.is_finite() {
            return Err(DesError::InvalidTime(t));
        }
        if t < self.current_t {
            return Err(DesError::NegativeDelay {
                current_t: self.current_t,
                delay: self.current_t - t,
            });
        }
        Ok(())
    }

    fn broadcast(&mut self, event: Event<T>) -> Result<(), DesError> {
        self.current_t = event.t;
        trace!("[{}] dispatching event #{}", event.t, event.seq);

        let mut scheduled = Vec::new();
        let mut new_agents = Vec::new();
        for agent in &mut self.agents {
            let response = agent.act(event.t, &event.data);
            scheduled.extend(response.events);
            new_agents.extend(response.agents);
        }
        for (t, data) in scheduled {
            self.check_time(t)?;
            self.push(t, data);
        }
        self.agents.extend(new_agents);
        Ok(())
    }

    /// Dispatch events up to and including `until`.
    ///
    /// Events due later than `until` are dropped and the clock stops at
    /// `until`. If the queue drains first the clock stays at the last
    /// dispatched event.
    pub fn run(&mut self, until: f64) -> Result<(), DesError> {
        if !until.is_finite() {
            return Err(DesError::InvalidTime(until));
        }
        while let Some(next) = self.queue.peek() {
            if next.t > until {
                trace!(
                    "[{}] horizon reached, discarding {} pending events",
                    until,
                    self.queue.len()
                );
                self.queue.clear();
                self.current_t = until;
                break;
            }
            self.check_time(next.t)?;
            if let Some(event) = self.queue.pop() {
                self.broadcast(event)?;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> Vec<S> {
        self.agents.iter().map(|agent| agent.stats()).collect()
    }
}
