//! Random-permutation baseline
//!
//! Replays the edges in uniformly random orders and reports the cut-cost
//! spread. Gives the other strategies a floor to beat; never persists a
//! partition.

use crate::cluster::{DenseComponent, MeaningCalculator, ProcessOutcome};
use crate::component::Component;
use crate::config::Config;
use crate::error::Result;
use itertools::{Itertools, MinMaxResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineStats {
    pub trials: usize,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

pub struct RandomBaseline {
    trials: usize,
    seed: u64,
    last: Option<BaselineStats>,
}

impl RandomBaseline {
    pub fn new(config: &Config) -> Self {
        Self {
            trials: config.baseline_trials.max(1),
            seed: config.seed.unwrap_or_else(|| rand::rng().random()),
            last: None,
        }
    }

    /// Stats from the most recent [`MeaningCalculator::process`] call.
    pub fn last_stats(&self) -> Option<BaselineStats> {
        self.last
    }
}

impl MeaningCalculator for RandomBaseline {
    fn name(&self) -> &'static str {
        "random"
    }

    fn authority(&self) -> &'static str {
        "analysis.random"
    }

    fn stores_result(&self) -> bool {
        false
    }

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome> {
        comp.init_clusters();
        let dense = DenseComponent::new(comp);

        // Each trial gets its own derived seed so the set of trials is
        // reproducible regardless of thread scheduling.
        let base = self.seed;
        let costs: Vec<f64> = (0..self.trials)
            .into_par_iter()
            .map(|trial| {
                let mut rng = StdRng::seed_from_u64(base.wrapping_add(trial as u64));
                let mut order: Vec<usize> = (0..dense.edge_count()).collect();
                order.shuffle(&mut rng);
                dense.cut_cost(&dense.replay(order).cut)
            })
            .collect();

        let (min, max) = match costs.iter().copied().minmax() {
            MinMaxResult::MinMax(min, max) => (min, max),
            MinMaxResult::OneElement(only) => (only, only),
            MinMaxResult::NoElements => (0.0, 0.0),
        };
        let avg = costs.iter().sum::<f64>() / costs.len() as f64;
        log::info!(
            "Random baseline: {} min {:.2} avg {:.2} max {:.2} over {} trials",
            comp.id(),
            min,
            avg,
            max,
            costs.len()
        );
        self.last = Some(BaselineStats {
            trials: costs.len(),
            min,
            avg,
            max,
        });
        Ok(ProcessOutcome::Completed)
    }
}
