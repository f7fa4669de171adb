//! Greedy clique-style agglomeration
//!
//! Repeatedly seeds a group at the cluster with the heaviest total edge
//! weight, grows it with the closest language-disjoint neighbor that is
//! still adjacent to every member, and merges the group when it reaches the
//! size threshold. A first pass demands `theta` members; a second pass
//! sweeps up the remainder pairwise.

use crate::cluster::{MeaningCalculator, ProcessOutcome};
use crate::component::{ClusterId, Component};
use crate::config::Config;
use crate::error::Result;
use std::collections::{HashMap, HashSet};

struct ClusterInfo {
    langs: HashSet<String>,
    /// Summed weight of the edges toward each neighboring cluster.
    weights: HashMap<ClusterId, f64>,
    sum: f64,
}

fn build_lookup(comp: &Component) -> HashMap<ClusterId, ClusterInfo> {
    let mut lookup: HashMap<ClusterId, ClusterInfo> = comp
        .clusters()
        .values()
        .map(|&id| {
            (
                id,
                ClusterInfo {
                    langs: comp.cluster_langs(id).cloned().unwrap_or_default(),
                    weights: HashMap::new(),
                    sum: 0.0,
                },
            )
        })
        .collect();

    for (edge, (a, b)) in comp.core_links().iter().enumerate() {
        let (ca, cb) = (comp.cluster_of(a), comp.cluster_of(b));
        if ca == cb {
            continue;
        }
        let weight = comp.weight(edge);
        let info = lookup.get_mut(&ca).unwrap();
        *info.weights.entry(cb).or_insert(0.0) += weight;
        info.sum += weight;
        let info = lookup.get_mut(&cb).unwrap();
        *info.weights.entry(ca).or_insert(0.0) += weight;
        info.sum += weight;
    }
    lookup
}

pub struct CliquesCalculator {
    theta: usize,
}

impl CliquesCalculator {
    pub fn new(config: &Config) -> Self {
        Self {
            theta: config.clique_theta.max(2),
        }
    }

    /// One agglomeration pass; merges only groups of at least `threshold`
    /// clusters. Seeds that fail to reach the threshold are not retried.
    fn pass(&self, comp: &mut Component, threshold: usize) -> Result<()> {
        let mut failed: HashSet<ClusterId> = HashSet::new();
        loop {
            let lookup = build_lookup(comp);
            let seed = lookup
                .iter()
                .filter(|(id, info)| {
                    !failed.contains(*id)
                        && info
                            .weights
                            .keys()
                            .any(|n| lookup[n].langs.is_disjoint(&info.langs))
                })
                // Heaviest first; ties go to the smaller cluster id.
                .max_by(|(ia, a), (ib, b)| {
                    a.sum.partial_cmp(&b.sum).unwrap().then_with(|| ib.cmp(ia))
                })
                .map(|(&id, _)| id);
            let Some(seed) = seed else {
                return Ok(());
            };

            let mut group = vec![seed];
            let mut group_langs = lookup[&seed].langs.clone();
            let mut possible: HashSet<ClusterId> = lookup[&seed].weights.keys().copied().collect();
            loop {
                let closest = possible
                    .iter()
                    .filter(|c| lookup[*c].langs.is_disjoint(&group_langs))
                    .map(|&c| {
                        let toward: f64 =
                            group.iter().filter_map(|g| lookup[&c].weights.get(g)).sum();
                        (c, toward)
                    })
                    .max_by(|(ca, wa), (cb, wb)| {
                        wa.partial_cmp(wb).unwrap().then_with(|| cb.cmp(ca))
                    });
                let Some((chosen, _)) = closest else {
                    break;
                };
                group_langs.extend(lookup[&chosen].langs.iter().cloned());
                group.push(chosen);
                // Candidates must stay adjacent to every group member.
                possible.retain(|c| lookup[&chosen].weights.contains_key(c));
            }

            if group.len() < threshold {
                failed.insert(seed);
                continue;
            }
            let master = *group.iter().min().unwrap();
            for &other in &group {
                if other != master {
                    comp.merge(master, other)?;
                }
            }
            log::debug!("Merged {} clusters into {}", group.len(), master);
        }
    }
}

impl MeaningCalculator for CliquesCalculator {
    fn name(&self) -> &'static str {
        "cliques"
    }

    fn authority(&self) -> &'static str {
        "analysis.cliques"
    }

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome> {
        comp.init_clusters();
        self.pass(comp, self.theta)?;
        self.pass(comp, 2)?;
        let cut = comp.crossing_edges();
        let cost = comp.cut_cost(&cut);
        comp.set_cut(cut)?;
        log::info!("Total cost: {} {:.2}", comp.id(), cost);
        Ok(ProcessOutcome::Completed)
    }
}
