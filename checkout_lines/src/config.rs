//! Experiment configuration.
//!
//! Defaults reproduce the classic grocery-store setup: three registers,
//! twenty customers waiting at opening, a horizon of 100 time units and
//! arrival intervals `0.5 + 3.5 * j / 20` for `j` in `1..20`. A config can
//! also be read from TOML; missing keys keep their defaults.
//!
//! ```toml
//! trials = 50
//! seed = 7
//! aggregation = "mean-of-trial-means"
//!
//! [sweep]
//! divisions = 10
//! ```

use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LinearServiceTime, SimError, sweep::arrival_intervals};

/// How per-trial wait samples are reduced to one number per arrival interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Mean over every sample from every trial
    #[default]
    PoolAllTrials,
    /// Mean over the samples of the final trial only
    LastTrialOnly,
    /// Mean of the per-trial means
    MeanOfTrialMeans,
}

impl Aggregation {
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::PoolAllTrials => "pool-all-trials",
            Aggregation::LastTrialOnly => "last-trial-only",
            Aggregation::MeanOfTrialMeans => "mean-of-trial-means",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Aggregation {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pool-all-trials" | "pool" => Ok(Aggregation::PoolAllTrials),
            "last-trial-only" | "last" => Ok(Aggregation::LastTrialOnly),
            "mean-of-trial-means" | "means" => Ok(Aggregation::MeanOfTrialMeans),
            other => Err(SimError::invalid(format!(
                "unknown aggregation '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub per_item: f64,
    pub overhead: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let linear = LinearServiceTime::default();
        ServiceConfig {
            per_item: linear.per_item,
            overhead: linear.overhead,
        }
    }
}

impl From<&ServiceConfig> for LinearServiceTime {
    fn from(config: &ServiceConfig) -> Self {
        LinearServiceTime::new(config.per_item, config.overhead)
    }
}

/// Arrival intervals `base + span * j / divisions` for `j` in `1..divisions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSpec {
    pub base: f64,
    pub span: f64,
    pub divisions: usize,
}

impl Default for SweepSpec {
    fn default() -> Self {
        SweepSpec {
            base: 0.5,
            span: 3.5,
            divisions: 20,
        }
    }
}

impl SweepSpec {
    pub fn intervals(&self) -> Vec<f64> {
        arrival_intervals(self.base, self.span, self.divisions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub trials: usize,
    pub registers: usize,
    pub initial_population: usize,
    pub horizon: f64,
    pub min_items: u32,
    pub max_items: u32,
    pub seed: u64,
    pub aggregation: Aggregation,
    /// Worker threads for running trials; rayon's default when unset
    pub threads: Option<usize>,
    pub service: ServiceConfig,
    pub sweep: SweepSpec,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: 1,
            registers: 3,
            initial_population: 20,
            horizon: 100.0,
            min_items: 1,
            max_items: 20,
            seed: 0,
            aggregation: Aggregation::default(),
            threads: None,
            service: ServiceConfig::default(),
            sweep: SweepSpec::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn registers(&self) -> Result<NonZeroUsize, SimError> {
        NonZeroUsize::new(self.registers)
            .ok_or_else(|| SimError::invalid("number of registers must be positive"))
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.trials == 0 {
            return Err(SimError::invalid("number of trials must be positive"));
        }
        self.registers()?;
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimError::invalid(format!(
                "horizon must be a positive number, got {}",
                self.horizon
            )));
        }
        if self.min_items > self.max_items {
            return Err(SimError::invalid(format!(
                "min_items {} exceeds max_items {}",
                self.min_items, self.max_items
            )));
        }
        if self.threads == Some(0) {
            return Err(SimError::invalid("thread count must be positive"));
        }

        let ServiceConfig { per_item, overhead } = self.service;
        if !(per_item.is_finite() && overhead.is_finite()) || per_item < 0.0 || overhead < 0.0 {
            return Err(SimError::invalid(format!(
                "service time coefficients must be non-negative, got per_item={} overhead={}",
                per_item, overhead
            )));
        }

        if self.sweep.divisions < 2 {
            return Err(SimError::invalid("sweep needs at least two divisions"));
        }
        if let Some(bad) = self
            .sweep
            .intervals()
            .into_iter()
            .find(|interval| !(interval.is_finite() && *interval > 0.0))
        {
            return Err(SimError::invalid(format!(
                "arrival intervals must be positive, got {}",
                bad
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registers, 3);
        assert_eq!(config.initial_population, 20);
        assert_eq!(config.horizon, 100.0);
        assert_eq!(config.sweep.intervals().len(), 19);
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            SimulationConfig {
                trials: 0,
                ..Default::default()
            },
            SimulationConfig {
                registers: 0,
                ..Default::default()
            },
            SimulationConfig {
                horizon: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                min_items: 10,
                max_items: 2,
                ..Default::default()
            },
            SimulationConfig {
                threads: Some(0),
                ..Default::default()
            },
            SimulationConfig {
                service: ServiceConfig {
                    per_item: -0.25,
                    overhead: 2.0,
                },
                ..Default::default()
            },
            SimulationConfig {
                sweep: SweepSpec {
                    base: -3.0,
                    span: 1.0,
                    divisions: 4,
                },
                ..Default::default()
            },
            SimulationConfig {
                sweep: SweepSpec {
                    divisions: 1,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(SimError::InvalidConfiguration(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            trials = 5
            seed = 11
            aggregation = "last-trial-only"

            [service]
            overhead = 1.0

            [sweep]
            divisions = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.trials, 5);
        assert_eq!(config.seed, 11);
        assert_eq!(config.aggregation, Aggregation::LastTrialOnly);
        assert_eq!(config.registers, 3);
        assert_eq!(config.service.per_item, 0.25);
        assert_eq!(config.service.overhead, 1.0);
        assert_eq!(config.sweep.intervals().len(), 3);
    }

    #[test]
    fn toml_rejects_unknown_keys_and_invalid_values() {
        assert!(matches!(
            SimulationConfig::from_toml_str("checkouts = 4"),
            Err(SimError::Toml(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("trials = 0"),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn aggregation_parsing() {
        assert_eq!(
            "mean-of-trial-means".parse::<Aggregation>().unwrap(),
            Aggregation::MeanOfTrialMeans
        );
        assert_eq!("last".parse::<Aggregation>().unwrap(), Aggregation::LastTrialOnly);
        assert!("median".parse::<Aggregation>().is_err());
        assert_eq!(Aggregation::default().to_string(), "pool-all-trials");
    }
}
