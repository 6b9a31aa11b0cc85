//! A single replication: fresh store, fresh clock, one arrival interval.

use std::num::NonZeroUsize;
use std::sync::Arc;

use des::EventLoop;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::{
    ArrivalProcess, CustomerGenerator, Discipline, Event, LinearServiceTime, ServiceTime,
    SimError, SimulationConfig, Stats, Store,
};

/// Wait before service for one customer who finished checking out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaitSample {
    pub customer: usize,
    pub items: u32,
    pub lane: usize,
    pub elapsed: f64,
    pub completed_at: f64,
}

/// Everything one trial produced, returned rather than accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub seed: u64,
    pub arrival_interval: f64,
    pub arrivals: usize,
    pub served: usize,
    pub peak_waiting: usize,
    pub samples: Vec<WaitSample>,
}

impl TrialResult {
    pub fn from_stats(
        trial: usize,
        seed: u64,
        arrival_interval: f64,
        stats: Vec<Stats>,
    ) -> Result<TrialResult, SimError> {
        let store = stats
            .into_iter()
            .find_map(|s| match s {
                Stats::Store(store) => Some(store),
                _ => None,
            })
            .ok_or(SimError::MissingStats { trial })?;

        Ok(TrialResult {
            trial,
            seed,
            arrival_interval,
            arrivals: store.arrivals,
            served: store.served,
            peak_waiting: store.peak_waiting,
            samples: store.samples,
        })
    }

    /// Customers still waiting or at a register when the horizon hit
    pub fn unfinished(&self) -> usize {
        self.arrivals - self.served
    }

    pub fn total_wait(&self) -> f64 {
        self.samples.iter().map(|s| s.elapsed).sum()
    }

    pub fn mean_wait(&self) -> Result<f64, SimError> {
        if self.samples.is_empty() {
            return Err(SimError::NoSamples {
                interval: self.arrival_interval,
                trial: self.trial,
            });
        }
        Ok(self.total_wait() / self.samples.len() as f64)
    }
}

/// A validated configuration ready to run trials.
///
/// The service-time formula defaults to the linear one from the config and
/// can be swapped with [`Experiment::with_service_time`].
#[derive(Clone)]
pub struct Experiment {
    pub(crate) config: SimulationConfig,
    registers: NonZeroUsize,
    items: Uniform<u32>,
    service_time: Arc<dyn ServiceTime>,
}

impl Experiment {
    pub fn new(config: SimulationConfig) -> Result<Experiment, SimError> {
        config.validate()?;
        let registers = config.registers()?;
        let items = CustomerGenerator::item_range(config.min_items, config.max_items)?;
        let service_time: Arc<dyn ServiceTime> =
            Arc::new(LinearServiceTime::from(&config.service));
        Ok(Experiment {
            config,
            registers,
            items,
            service_time,
        })
    }

    pub fn with_service_time(mut self, service_time: Arc<dyn ServiceTime>) -> Experiment {
        self.service_time = service_time;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed for a trial, shared by both disciplines so they see the same customers
    pub fn trial_seed(&self, interval_index: usize, trial: usize) -> u64 {
        self.config
            .seed
            .wrapping_add(((interval_index as u64) << 32) | trial as u64)
    }

    /// Fresh event loop for one trial. `arrival_interval` must be positive.
    pub(crate) fn build_trial(
        &self,
        discipline: Discipline,
        arrival_interval: f64,
        seed: u64,
    ) -> EventLoop<Event, Stats> {
        let agents: Vec<Box<dyn des::Agent<Event, Stats>>> = vec![
            Box::new(ArrivalProcess::new(
                CustomerGenerator::new(seed, self.items.clone()),
                self.config.initial_population,
                arrival_interval,
            )),
            Box::new(Store::new(
                discipline.registers(self.registers),
                Arc::clone(&self.service_time),
            )),
        ];
        EventLoop::new(vec![(0.0, Event::Start)], agents)
    }

    pub(crate) fn check_interval(arrival_interval: f64) -> Result<(), SimError> {
        if arrival_interval.is_finite() && arrival_interval > 0.0 {
            Ok(())
        } else {
            Err(SimError::invalid(format!(
                "arrival interval must be positive, got {}",
                arrival_interval
            )))
        }
    }

    /// Run one trial on the calling thread. `trial` only labels the result.
    pub fn run_trial(
        &self,
        discipline: Discipline,
        arrival_interval: f64,
        trial: usize,
        seed: u64,
    ) -> Result<TrialResult, SimError> {
        Self::check_interval(arrival_interval)?;
        let mut event_loop = self.build_trial(discipline, arrival_interval, seed);
        event_loop.run(self.config.horizon)?;
        TrialResult::from_stats(trial, seed, arrival_interval, event_loop.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(elapsed: f64) -> WaitSample {
        WaitSample {
            customer: 0,
            items: 1,
            lane: 0,
            elapsed,
            completed_at: 10.0,
        }
    }

    fn result(samples: Vec<WaitSample>) -> TrialResult {
        TrialResult {
            trial: 2,
            seed: 0,
            arrival_interval: 1.5,
            arrivals: 10,
            served: samples.len(),
            peak_waiting: 0,
            samples,
        }
    }

    #[test]
    fn mean_wait_over_samples() {
        let trial = result(vec![sample(0.0), sample(3.0), sample(6.0)]);
        assert_eq!(trial.mean_wait().unwrap(), 3.0);
        assert_eq!(trial.unfinished(), 7);
    }

    #[test]
    fn empty_trial_has_no_mean() {
        let err = result(vec![]).mean_wait().unwrap_err();
        assert!(matches!(err, SimError::NoSamples { trial: 2, .. }));
    }

    #[test]
    fn missing_store_stats_reported() {
        let stats = vec![Stats::Arrivals(crate::ArrivalStats { generated: 3 })];
        let err = TrialResult::from_stats(4, 0, 1.0, stats).unwrap_err();
        assert!(matches!(err, SimError::MissingStats { trial: 4 }));
    }

    #[test]
    fn non_positive_interval_rejected() {
        let experiment = Experiment::new(SimulationConfig::default()).unwrap();
        for interval in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                experiment.run_trial(Discipline::SingleLine, interval, 0, 1),
                Err(SimError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn empty_trial_names_its_index() {
        let experiment = Experiment::new(SimulationConfig {
            horizon: 2.0,
            ..Default::default()
        })
        .unwrap();

        let trial = experiment
            .run_trial(Discipline::MultiLine, 1.0, 6, experiment.trial_seed(0, 6))
            .unwrap();

        assert_eq!(trial.trial, 6);
        assert!(matches!(
            trial.mean_wait(),
            Err(SimError::NoSamples { trial: 6, .. })
        ));
    }

    #[test]
    fn seeds_differ_per_trial_and_interval() {
        let experiment = Experiment::new(SimulationConfig::default()).unwrap();
        assert_ne!(experiment.trial_seed(0, 1), experiment.trial_seed(1, 0));
        assert_ne!(experiment.trial_seed(0, 0), experiment.trial_seed(0, 1));
    }
}
