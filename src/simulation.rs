//! Plot-ready data for random variables.
//!
//! The crate draws nothing itself; it hands `(x, y)` series to whatever
//! renders them. [`density`] is a sampled frequency histogram and
//! [`cumulative`] is the exact distribution function at each outcome.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::numeric::{self, Value};
use crate::randvar::RandVar;
use crate::random::create_rng;

/// A series of points for a bar or line chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PlotData {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// A time series: `x` is `0, 1, 2, …` and `y` the given values.
    pub fn from_series(values: &[Value]) -> Self {
        Self {
            x: (0..values.len()).map(|t| t as f64).collect(),
            y: values.iter().map(numeric::to_f64).collect(),
        }
    }
}

/// Generator described by `config`: seeded when a seed is set, `None`
/// otherwise so the caller supplies its own.
pub fn config_rng(config: &SimulationConfig) -> Option<SmallRng> {
    config.seed.map(create_rng)
}

/// Frequency of each outcome over `config.iterations` draws.
///
/// `x` holds every outcome value in ascending order, including outcomes
/// that were never drawn (count 0), and `y` the matching counts.
pub fn density<R: Rng>(var: &RandVar, config: &SimulationConfig, rng: &mut R) -> PlotData {
    let mut counts: BTreeMap<Value, usize> = var.values().into_iter().map(|v| (v, 0)).collect();
    for draw in var.generate(config.iterations, rng) {
        if let Some(count) = counts.get_mut(&draw) {
            *count += 1;
        }
    }
    debug!(
        name = %var.name(),
        iterations = config.iterations,
        outcomes = counts.len(),
        "sampled density"
    );
    PlotData {
        x: counts.keys().map(numeric::to_f64).collect(),
        y: counts.values().map(|&c| c as f64).collect(),
    }
}

/// [`density`] for several variables sharing one generator.
pub fn densities<R: Rng>(vars: &[RandVar], config: &SimulationConfig, rng: &mut R) -> Vec<PlotData> {
    vars.iter().map(|var| density(var, config, rng)).collect()
}

/// `P(X <= v)` at each outcome value `v`, ascending.
pub fn cumulative(var: &RandVar) -> PlotData {
    let mut values = var.values();
    values.sort();
    values.dedup();
    PlotData {
        y: values.iter().map(|v| numeric::to_f64(&var.cdf(v))).collect(),
        x: values.iter().map(numeric::to_f64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::int;

    fn die() -> RandVar {
        RandVar::from_pairs(
            "D",
            [
                (1, 0.25),
                (2, 0.25),
                (3, 0.25),
                (4, 0.25),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_density_counts_every_draw() {
        let config = SimulationConfig::default().with_iterations(400).with_seed(7);
        let mut rng = config_rng(&config).unwrap();
        let data = density(&die(), &config, &mut rng);
        assert_eq!(data.x, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data.y.iter().sum::<f64>(), 400.0);
        // Roughly uniform.
        assert!(data.y.iter().all(|&c| c > 50.0 && c < 150.0));
    }

    #[test]
    fn test_density_keeps_zero_counts() {
        let var = RandVar::from_pairs("Z", [(0, 0.99999), (1, 0.00001)]).unwrap();
        let config = SimulationConfig::default().with_iterations(10);
        let mut rng = create_rng(1);
        let data = density(&var, &config, &mut rng);
        assert_eq!(data.len(), 2);
        assert_eq!(data.y.iter().sum::<f64>(), 10.0);
    }

    #[test]
    fn test_density_is_reproducible() {
        let config = SimulationConfig::default().with_seed(42);
        let a = density(&die(), &config, &mut config_rng(&config).unwrap());
        let b = density(&die(), &config, &mut config_rng(&config).unwrap());
        assert_eq!(a, b);
        assert!(config_rng(&SimulationConfig::default()).is_none());
    }

    #[test]
    fn test_densities() {
        let config = SimulationConfig::default().with_iterations(50);
        let other = die().shift(&int(10));
        let data = densities(&[die(), other], &config, &mut create_rng(3));
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].x, vec![11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn test_cumulative() {
        let data = cumulative(&die());
        assert_eq!(data.x, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data.y, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_from_series() {
        let data = PlotData::from_series(&[int(0), int(1), int(0), int(-1)]);
        assert_eq!(data.x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(data.y, vec![0.0, 1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_serialize() {
        let data = PlotData {
            x: vec![1.0],
            y: vec![0.5],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"x":[1.0],"y":[0.5]}"#);
    }
}
