//! Genetic search over edge-replay orders
//!
//! A candidate is the cut produced by replaying the edges in some order, so
//! every individual in the population decodes to a valid partition.
//! Recombination keeps the edges both parents agree on and reshuffles the
//! ones they dispute; fresh random individuals keep the pool diverse.

use crate::cluster::{CancelFlag, DenseComponent, MeaningCalculator, ProcessOutcome};
use crate::component::Component;
use crate::config::Config;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

pub struct GeneticCalculator {
    population: usize,
    random_quota: usize,
    mutation: f64,
    stagnation: usize,
    max_generations: usize,
    rng: StdRng,
    cancel: CancelFlag,
}

impl GeneticCalculator {
    pub fn new(config: &Config, cancel: CancelFlag) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            population: config.ga_population.max(2),
            random_quota: config.ga_random_quota.min(config.ga_population),
            mutation: config.ga_mutation,
            stagnation: config.ga_stagnation.max(1),
            max_generations: config.ga_max_generations,
            rng,
            cancel,
        }
    }

    fn random_cut(&mut self, dense: &DenseComponent) -> BTreeSet<usize> {
        let mut order: Vec<usize> = (0..dense.edge_count()).collect();
        order.shuffle(&mut self.rng);
        dense.replay(order).cut.into_iter().collect()
    }

    /// One child: the edges both parents agree on keep their ascending
    /// order, the disputed ones are shuffled in afterwards, and the whole
    /// order occasionally has two positions swapped.
    fn offspring(
        &mut self,
        dense: &DenseComponent,
        first: &BTreeSet<usize>,
        second: &BTreeSet<usize>,
    ) -> BTreeSet<usize> {
        let mut order: Vec<usize> = (0..dense.edge_count())
            .filter(|e| first.contains(e) == second.contains(e))
            .collect();
        let mut disputed: Vec<usize> = (0..dense.edge_count())
            .filter(|e| first.contains(e) != second.contains(e))
            .collect();
        disputed.shuffle(&mut self.rng);
        order.extend(disputed);

        if order.len() > 2 && self.rng.random::<f64>() < self.mutation {
            let a = self.rng.random_range(0..order.len());
            let b = self.rng.random_range(0..order.len());
            order.swap(a, b);
        }
        dense.replay(order).cut.into_iter().collect()
    }

    fn roulette(&mut self, cumulative: &[f64]) -> usize {
        let total = *cumulative.last().unwrap_or(&0.0);
        let pick = self.rng.random_range(0.0..total);
        cumulative.partition_point(|&bound| bound <= pick)
    }
}

impl MeaningCalculator for GeneticCalculator {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn authority(&self) -> &'static str {
        "analysis.genetic"
    }

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome> {
        comp.init_clusters();
        let dense = DenseComponent::new(comp);

        let mut candidates: Vec<BTreeSet<usize>> = (0..self.population)
            .map(|_| self.random_cut(&dense))
            .collect();
        let mut best_cut: Option<BTreeSet<usize>> = None;
        let mut best_cost = f64::INFINITY;
        let mut stagnant = 0usize;

        for generation in 0..self.max_generations {
            if self.cancel.is_cancelled() {
                return Ok(ProcessOutcome::Cancelled);
            }

            let costs: Vec<f64> = candidates
                .par_iter()
                .map(|cut| {
                    let edges: Vec<usize> = cut.iter().copied().collect();
                    dense.cut_cost(&edges)
                })
                .collect();

            let mut improved = false;
            for (candidate, &cost) in candidates.iter().zip(&costs) {
                if cost < best_cost - 1e-12 {
                    best_cost = cost;
                    best_cut = Some(candidate.clone());
                    improved = true;
                }
            }
            if improved {
                stagnant = 0;
                log::debug!("Generation {generation}: best cost {best_cost:.2}");
            } else {
                stagnant += 1;
                if stagnant >= self.stagnation {
                    break;
                }
            }

            let fitness: Vec<f64> = costs.iter().map(|cost| 1.0 / (1.0 + cost.sqrt())).collect();
            let cumulative: Vec<f64> = fitness
                .iter()
                .scan(0.0, |acc, f| {
                    *acc += f;
                    Some(*acc)
                })
                .collect();

            let mut next = Vec::with_capacity(self.population);
            while next.len() + self.random_quota < self.population {
                let first = candidates[self.roulette(&cumulative)].clone();
                let second = candidates[self.roulette(&cumulative)].clone();
                next.push(self.offspring(&dense, &first, &second));
                if next.len() + self.random_quota < self.population {
                    next.push(self.offspring(&dense, &second, &first));
                }
            }
            while next.len() < self.population {
                next.push(self.random_cut(&dense));
            }
            candidates = next;
        }

        let cut: HashSet<usize> = best_cut.unwrap_or_default().into_iter().collect();
        comp.set_cut(cut)?;
        log::info!("Total cost: {} {:.2}", comp.id(), best_cost);
        Ok(ProcessOutcome::Completed)
    }
}
