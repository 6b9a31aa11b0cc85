//! Sweeps over arrival intervals and the two-discipline comparison.

use des::parallel::ParallelRunner;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{Aggregation, Discipline, Experiment, SimError, TrialResult};

/// `base + span * j / divisions` for `j` in `1..divisions`
pub fn arrival_intervals(base: f64, span: f64, divisions: usize) -> Vec<f64> {
    (1..divisions)
        .map(|j| base + span * j as f64 / divisions as f64)
        .collect()
}

/// Reduce the trials at one arrival interval to a single mean wait.
pub fn aggregate(trials: &[TrialResult], strategy: Aggregation) -> Result<f64, SimError> {
    let Some(last) = trials.last() else {
        return Err(SimError::invalid("no trials to aggregate"));
    };
    match strategy {
        Aggregation::PoolAllTrials => {
            let count: usize = trials.iter().map(|t| t.samples.len()).sum();
            if count == 0 {
                return Err(SimError::NoSamples {
                    interval: last.arrival_interval,
                    trial: last.trial,
                });
            }
            let total: f64 = trials.iter().map(TrialResult::total_wait).sum();
            Ok(total / count as f64)
        }
        Aggregation::LastTrialOnly => last.mean_wait(),
        Aggregation::MeanOfTrialMeans => {
            let means = trials
                .iter()
                .map(TrialResult::mean_wait)
                .collect::<Result<Vec<f64>, SimError>>()?;
            Ok(means.iter().sum::<f64>() / means.len() as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub arrival_interval: f64,
    pub mean_wait: f64,
    pub trials: usize,
    pub samples: usize,
    pub unfinished: usize,
}

/// Mean wait per arrival interval for one discipline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub discipline: Discipline,
    pub aggregation: Aggregation,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    /// `(arrival_interval, mean_wait)` pairs in sweep order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|p| (p.arrival_interval, p.mean_wait))
    }

    pub fn mean_wait_at(&self, arrival_interval: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.arrival_interval == arrival_interval)
            .map(|p| p.mean_wait)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub single_line: SweepResult,
    pub multi_line: SweepResult,
}

impl Comparison {
    /// `(arrival_interval, single_line, multi_line)` rows
    pub fn rows(&self) -> Vec<(f64, f64, f64)> {
        self.single_line
            .iter()
            .zip(self.multi_line.iter())
            .map(|((interval, single), (_, multi))| (interval, single, multi))
            .collect()
    }

    /// How much longer multi-line customers waited, per interval
    pub fn penalty(&self) -> Vec<(f64, f64)> {
        self.rows()
            .into_iter()
            .map(|(interval, single, multi)| (interval, multi - single))
            .collect()
    }
}

impl Experiment {
    /// Run every trial for one arrival interval and aggregate them
    pub fn run_point(
        &self,
        discipline: Discipline,
        interval_index: usize,
        arrival_interval: f64,
    ) -> Result<SweepPoint, SimError> {
        Self::check_interval(arrival_interval)?;
        let trials = self.trials_at(discipline, interval_index, arrival_interval)?;
        let mean_wait = aggregate(&trials, self.config.aggregation)?;
        info!(
            "{} interval {:.3}: mean wait {:.3} over {} trials",
            discipline,
            arrival_interval,
            mean_wait,
            trials.len()
        );
        Ok(SweepPoint {
            arrival_interval,
            mean_wait,
            trials: trials.len(),
            samples: trials.iter().map(|t| t.samples.len()).sum(),
            unfinished: trials.iter().map(TrialResult::unfinished).sum(),
        })
    }

    /// Trials run in parallel; results come back in trial order
    pub fn trials_at(
        &self,
        discipline: Discipline,
        interval_index: usize,
        arrival_interval: f64,
    ) -> Result<Vec<TrialResult>, SimError> {
        Self::check_interval(arrival_interval)?;
        let runner = ParallelRunner::new(self.config.trials, |trial| {
            self.build_trial(
                discipline,
                arrival_interval,
                self.trial_seed(interval_index, trial),
            )
        });
        let runner = match self.config.threads {
            Some(n) => runner.num_threads(n),
            None => runner,
        };

        runner
            .run(self.config.horizon)
            .into_iter()
            .enumerate()
            .map(|(trial, result)| {
                let stats = result.map_err(|e| SimError::from_scenario(trial, e))?;
                TrialResult::from_stats(
                    trial,
                    self.trial_seed(interval_index, trial),
                    arrival_interval,
                    stats,
                )
            })
            .collect()
    }

    pub fn run_sweep(&self, discipline: Discipline) -> Result<SweepResult, SimError> {
        let points = self
            .config
            .sweep
            .intervals()
            .into_iter()
            .enumerate()
            .map(|(index, interval)| self.run_point(discipline, index, interval))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SweepResult {
            discipline,
            aggregation: self.config.aggregation,
            points,
        })
    }

    pub fn compare(&self) -> Result<Comparison, SimError> {
        Ok(Comparison {
            single_line: self.run_sweep(Discipline::SingleLine)?,
            multi_line: self.run_sweep(Discipline::MultiLine)?,
        })
    }
}
