//! Coherence-restoring clustering
//!
//! Four interchangeable strategies partition an incoherent component into
//! clusters that are individually coherent (at most one non-redirect page
//! per language) while cutting as little language-link weight as possible.

pub mod betweenness;
pub mod cliques;
pub mod genetic;
pub mod random;

pub use betweenness::{BetweennessCalculator, NewmanGirvanCalculator};
pub use cliques::CliquesCalculator;
pub use genetic::GeneticCalculator;
pub use random::RandomBaseline;

use crate::component::{Component, PageKey};
use crate::config::{Config, LARGE_COMPONENT_LIMIT};
use crate::error::{AnalysisError, Result};
use crate::repo::Repository;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Cooperative cancellation for the long-running searches. Checked at
/// iteration boundaries only, so component state is never left half-mutated.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How one clustering invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed,
    /// The in-progress cut search was discarded; nothing is stored.
    Cancelled,
}

/// One clustering strategy. Implementations mutate the component's cluster
/// partition and leave its links and weights untouched.
pub trait MeaningCalculator {
    fn name(&self) -> &'static str;

    /// Tag under which this strategy's meanings are stored, so results
    /// from different strategies coexist.
    fn authority(&self) -> &'static str;

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome>;

    /// Baselines report costs without persisting a partition.
    fn stores_result(&self) -> bool {
        true
    }
}

/// Deterministic meaning id: UUIDv5 over the sorted serialized member keys
/// joined by spaces. Identical clustering output yields the identical id.
pub fn meaning_id(sorted_keys: &[String]) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, sorted_keys.join(" ").as_bytes()).to_string()
}

/// Runs one calculator over every incoherent component in scope.
/// Returns the number of components whose result was stored.
pub fn process_all(
    repo: &mut dyn Repository,
    calc: &mut dyn MeaningCalculator,
    config: &Config,
    skip_large: bool,
) -> Result<usize> {
    let upper = config
        .max_component_size
        .or(if skip_large { Some(LARGE_COMPONENT_LIMIT) } else { None });
    let ids = repo.get_incoherent(config.min_component_size, upper)?;
    log::info!(
        "Running {} over {} incoherent components",
        calc.name(),
        ids.len()
    );
    let mut stored = 0;
    for id in ids {
        match process_component(repo, calc, config, &id)? {
            ProcessOutcome::Completed => stored += 1,
            ProcessOutcome::Cancelled => {
                log::warn!("Cancelled while processing {id}; stopping");
                break;
            }
        }
    }
    Ok(stored)
}

/// Loads one component, applies the configured weighting, runs the
/// calculator, and stores the meaning assignment. Nothing is written if
/// the calculator fails or is cancelled.
pub fn process_component(
    repo: &mut dyn Repository,
    calc: &mut dyn MeaningCalculator,
    config: &Config,
    id: &str,
) -> Result<ProcessOutcome> {
    log::debug!("Processing component {id}");
    let pages = repo.get_component_pages(id)?;
    let links = repo.get_component_lang_links(id)?;
    let mut comp = Component::new(id, pages, links, config)?;

    if config.common_categories || config.common_outlinks {
        comp.update_weights(repo, config)?;
    }
    if config.flat_weights {
        comp.reset_weights();
    }

    match calc.process(&mut comp)? {
        ProcessOutcome::Cancelled => Ok(ProcessOutcome::Cancelled),
        ProcessOutcome::Completed => {
            if calc.stores_result() {
                store_meaning(repo, &comp, calc.authority())?;
            }
            Ok(ProcessOutcome::Completed)
        }
    }
}

/// Persists the component's current partition as meanings: every page
/// (redirects folded into their target's cluster) lands in exactly one
/// meaning, replacing whatever the authority stored before.
pub fn store_meaning(repo: &mut dyn Repository, comp: &Component, authority: &str) -> Result<()> {
    let mut by_cluster: HashMap<u32, Vec<PageKey>> = HashMap::new();
    for key in comp.pages().keys() {
        let mut main = key;
        let mut visited = HashSet::new();
        loop {
            let record = comp.record(main).ok_or_else(|| AnalysisError::PageNotFound {
                key: main.to_string(),
            })?;
            let Some(target) = &record.redirect else {
                break;
            };
            if !visited.insert(main.clone()) {
                return Err(AnalysisError::PageNotFound {
                    key: main.to_string(),
                });
            }
            main = target;
        }
        let cluster = comp.cluster_of(main);
        by_cluster.entry(cluster).or_default().push(key.clone());
    }

    repo.delete_page_meanings(authority, comp.id())?;
    for members in by_cluster.into_values() {
        let mut serialized: Vec<String> = members.iter().map(|k| k.to_string()).collect();
        serialized.sort_unstable();
        let id = meaning_id(&serialized);
        repo.insert_page_meanings(authority, &id, comp.id(), &members)?;
    }
    Ok(())
}

/// Dense read-only view of a component for the search algorithms: core
/// pages become node indices, languages become small integer ids, and
/// `edges` stays parallel to the component's core links.
pub(crate) struct DenseComponent {
    pub keys: Vec<PageKey>,
    pub langs: Vec<usize>,
    pub edges: Vec<(usize, usize)>,
    pub weights: Vec<f64>,
}

/// Result of replaying edges over a dense component.
pub(crate) struct Replay {
    /// Cluster id per node (a node index, not compacted).
    pub clusters: Vec<usize>,
    /// Edges whose endpoints' clusters conflicted when processed.
    pub cut: Vec<usize>,
}

impl DenseComponent {
    pub fn new(comp: &Component) -> Self {
        let keys: Vec<PageKey> = comp.core_pages().to_vec();
        let node_of: HashMap<&PageKey, usize> =
            keys.iter().enumerate().map(|(i, k)| (k, i)).collect();

        let mut lang_ids: HashMap<&str, usize> = HashMap::new();
        let langs = keys
            .iter()
            .map(|key| {
                let next = lang_ids.len();
                *lang_ids.entry(key.lang.as_str()).or_insert(next)
            })
            .collect();

        let edges = comp
            .core_links()
            .iter()
            .map(|(a, b)| (node_of[a], node_of[b]))
            .collect();
        let weights = (0..comp.core_links().len()).map(|e| comp.weight(e)).collect();

        Self {
            keys,
            langs,
            edges,
            weights,
        }
    }

    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Processes edges in the given order: merge endpoints when their
    /// clusters' languages are disjoint, skip edges already internal, and
    /// mark the rest as cut. The shared helper behind the single-shot
    /// betweenness replay, the genetic decoder, and the random baseline.
    pub fn replay(&self, order: impl IntoIterator<Item = usize>) -> Replay {
        let n = self.node_count();
        let mut clusters: Vec<usize> = (0..n).collect();
        let mut cluster_langs: Vec<HashSet<usize>> =
            self.langs.iter().map(|&l| HashSet::from([l])).collect();
        let mut cut = Vec::new();

        for edge in order {
            let (a, b) = self.edges[edge];
            let (ca, cb) = (clusters[a], clusters[b]);
            if ca == cb {
                continue;
            }
            if cluster_langs[ca].is_disjoint(&cluster_langs[cb]) {
                let absorbed = std::mem::take(&mut cluster_langs[cb]);
                cluster_langs[ca].extend(absorbed);
                for cluster in clusters.iter_mut() {
                    if *cluster == cb {
                        *cluster = ca;
                    }
                }
            } else {
                cut.push(edge);
            }
        }

        Replay { clusters, cut }
    }

    pub fn cut_cost(&self, cut: &[usize]) -> f64 {
        cut.iter().map(|&e| self.weights[e]).sum()
    }
}
