//! Replications spread over a rayon thread pool.
//!
//! Each scenario gets a fresh [`EventLoop`] from a builder closure, and
//! results come back in scenario order. A builder that derives its agents'
//! seeds from the scenario id gives the same results for any thread count.
//!
//! A scenario whose event loop fails returns [`ScenarioError::Engine`]. Panics
//! are caught and returned as [`ScenarioError::Panicked`]. Other scenarios
//! carry on.

use crate::{DesError, EventLoop};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Why a single scenario produced no stats.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("scenario panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Engine(#[from] DesError),
}

pub type ScenarioResult<S> = Result<Vec<S>, ScenarioError>;

/// Executes multiple EventLoop scenarios in parallel
///
/// The builder `F` takes a scenario id and returns a fresh EventLoop. It is
/// called on the worker thread, so agents themselves need not be `Send`.
pub struct ParallelRunner<T, S, F>
where
    F: Fn(usize) -> EventLoop<T, S> + Send + Sync,
    S: Send,
{
    num_scenarios: usize,
    builder: F,
    num_threads: Option<usize>,
    _scenario: PhantomData<fn() -> (T, S)>,
}

impl<T, S, F> ParallelRunner<T, S, F>
where
    F: Fn(usize) -> EventLoop<T, S> + Send + Sync,
    S: Send,
{
    pub fn new(num_scenarios: usize, builder: F) -> Self {
        ParallelRunner {
            num_scenarios,
            builder,
            num_threads: None,
            _scenario: PhantomData,
        }
    }

    /// Set number of threads (defaults to rayon's global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Execute all scenarios up to `run_until` and return results in order
    ///
    /// ```rust
    /// use des::parallel::ParallelRunner;
    /// # use des::{Agent, EventLoop};
    /// # struct TestAgent;
    /// # impl Agent<u8, usize> for TestAgent {
    /// #     fn stats(&self) -> usize { 7 }
    /// # }
    ///
    /// let results = ParallelRunner::new(10, |_| {
    ///     let agents: Vec<Box<dyn Agent<u8, usize>>> = vec![Box::new(TestAgent)];
    ///     EventLoop::new(vec![(0.0, 1)], agents)
    /// })
    /// .run(10.0);
    ///
    /// assert_eq!(results.len(), 10);
    /// assert!(results.iter().all(|r| r.is_ok()));
    /// ```
    pub fn run(self, run_until: f64) -> Vec<ScenarioResult<S>> {
        // Fall back to the global pool if a custom one cannot be built
        let pool = self.num_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| log::warn!("using global thread pool: {}", e))
                .ok()
        });

        let execute = || {
            (0..self.num_scenarios)
                .into_par_iter()
                .map(|scenario_id| {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        let mut event_loop = (self.builder)(scenario_id);
                        event_loop.run(run_until).map(|()| event_loop.stats())
                    }));
                    match result {
                        Ok(Ok(stats)) => Ok(stats),
                        Ok(Err(e)) => Err(ScenarioError::Engine(e)),
                        Err(payload) => Err(ScenarioError::Panicked(panic_message(payload))),
                    }
                })
                .collect()
        };

        match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
