//! Centrality-guided edge-cut clustering
//!
//! Edge betweenness is accumulated Brandes-style: a forward BFS per source
//! assigns distance and shortest-path counts, a backward pass over nodes in
//! decreasing distance order pushes dependency onto predecessor edges.

use crate::cluster::{CancelFlag, DenseComponent, MeaningCalculator, ProcessOutcome};
use crate::component::Component;
use crate::config::Config;
use crate::error::Result;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

/// Edge indices in ascending betweenness order, ties broken by discovery
/// order. `ignored` edges are excluded; only `scope` nodes act as sources.
fn edge_betweenness(dense: &DenseComponent, ignored: &HashSet<usize>, scope: &[usize]) -> Vec<usize> {
    let n = dense.node_count();
    let m = dense.edge_count();

    let mut neighbors: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (edge, &(a, b)) in dense.edges.iter().enumerate() {
        if ignored.contains(&edge) {
            continue;
        }
        neighbors[a].push((b, edge));
        neighbors[b].push((a, edge));
    }

    let totals: Vec<f64> = scope
        .par_iter()
        .map(|&source| single_source(&neighbors, n, m, source))
        .reduce(
            || vec![0.0; m],
            |mut acc, local| {
                for (slot, value) in acc.iter_mut().zip(local) {
                    *slot += value;
                }
                acc
            },
        );

    let mut order: Vec<usize> = (0..m).filter(|e| !ignored.contains(e)).collect();
    order.sort_by(|&x, &y| totals[x].partial_cmp(&totals[y]).unwrap());
    order
}

/// One Brandes accumulation: per-edge dependency contributed by shortest
/// paths out of `source`.
fn single_source(neighbors: &[Vec<(usize, usize)>], n: usize, m: usize, source: usize) -> Vec<f64> {
    let mut dist = vec![usize::MAX; n];
    let mut paths = vec![0.0f64; n];
    let mut prevs: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    dist[source] = 0;
    paths[source] = 1.0;
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &(next, edge) in &neighbors[node] {
            if dist[next] == usize::MAX {
                dist[next] = dist[node] + 1;
                paths[next] = paths[node];
                prevs[next].push((node, edge));
                queue.push_back(next);
            } else if dist[next] == dist[node] + 1 {
                paths[next] += paths[node];
                prevs[next].push((node, edge));
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    let mut local = vec![0.0f64; m];
    for &node in order.iter().rev() {
        let coefficient = (1.0 + delta[node]) / paths[node];
        for &(prev, edge) in &prevs[node] {
            let contribution = paths[prev] * coefficient;
            local[edge] += contribution;
            delta[prev] += contribution;
        }
    }
    local
}

/// Nodes still inside a "bad" cluster (two same-language pages) when the
/// graph is partitioned by the non-ignored edges. Computed on a scratch
/// union-find so the component's invariant-checked state stays untouched.
fn bad_pages(dense: &DenseComponent, ignored: &HashSet<usize>) -> Vec<usize> {
    let n = dense.node_count();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut Vec<usize>, x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    for (edge, &(a, b)) in dense.edges.iter().enumerate() {
        if ignored.contains(&edge) {
            continue;
        }
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut lang_counts: HashMap<(usize, usize), usize> = HashMap::new();
    let mut bad_roots = HashSet::new();
    for node in 0..n {
        let root = find(&mut parent, node);
        let seen = lang_counts.entry((root, dense.langs[node])).or_insert(0);
        *seen += 1;
        if *seen > 1 {
            bad_roots.insert(root);
        }
    }

    (0..n)
        .filter(|&node| bad_roots.contains(&find(&mut parent, node)))
        .collect()
}

/// Single-shot variant: one betweenness ranking, then a greedy replay in
/// ascending order that merges when legal and cuts otherwise.
pub struct BetweennessCalculator;

impl BetweennessCalculator {
    pub fn new(_config: &Config) -> Self {
        Self
    }
}

impl MeaningCalculator for BetweennessCalculator {
    fn name(&self) -> &'static str {
        "betweenness"
    }

    fn authority(&self) -> &'static str {
        "analysis.betweenness"
    }

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome> {
        comp.init_clusters();
        let dense = DenseComponent::new(comp);
        let sources: Vec<usize> = (0..dense.node_count()).collect();
        let order = edge_betweenness(&dense, &HashSet::new(), &sources);
        let replay = dense.replay(order);
        let cut: HashSet<usize> = replay.cut.iter().copied().collect();
        comp.set_cut(cut)?;
        log::info!(
            "Total cost: {} {:.2}",
            comp.id(),
            dense.cut_cost(&replay.cut)
        );
        Ok(ProcessOutcome::Completed)
    }
}

/// Iterative Newman–Girvan variant: repeatedly remove the single
/// highest-betweenness edge, shrink the recomputation scope to pages still
/// inside bad clusters, and stop as soon as none remain.
pub struct NewmanGirvanCalculator {
    cancel: CancelFlag,
}

impl NewmanGirvanCalculator {
    pub fn new(_config: &Config, cancel: CancelFlag) -> Self {
        Self { cancel }
    }
}

impl MeaningCalculator for NewmanGirvanCalculator {
    fn name(&self) -> &'static str {
        "newman-girvan"
    }

    fn authority(&self) -> &'static str {
        "analysis.newman-girvan"
    }

    fn process(&mut self, comp: &mut Component) -> Result<ProcessOutcome> {
        comp.init_clusters();
        let dense = DenseComponent::new(comp);
        let mut ignored = HashSet::new();
        let mut sequence = Vec::new();
        let mut scope: Vec<usize> = (0..dense.node_count()).collect();

        while sequence.len() < dense.edge_count() {
            if self.cancel.is_cancelled() {
                return Ok(ProcessOutcome::Cancelled);
            }
            let order = edge_betweenness(&dense, &ignored, &scope);
            let Some(&last) = order.last() else {
                break;
            };
            ignored.insert(last);
            sequence.push(last);
            scope = bad_pages(&dense, &ignored);
            log::debug!("Removed edge {last}, new scope size: {}", scope.len());
            if scope.is_empty() {
                break;
            }
        }

        // Merge the surviving edges first, then greedily re-admit removed
        // edges in removal order; the leftovers are the cut.
        let mut final_order: Vec<usize> =
            (0..dense.edge_count()).filter(|e| !ignored.contains(e)).collect();
        final_order.extend(&sequence);
        let replay = dense.replay(final_order);
        let cut: HashSet<usize> = replay.cut.iter().copied().collect();
        comp.set_cut(cut)?;
        log::info!(
            "Total cost: {} {:.2}",
            comp.id(),
            dense.cut_cost(&replay.cut)
        );
        Ok(ProcessOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::testutil::{assert_five_page_outcome, incoherent_five, simple_component};

    #[test]
    fn hub_edges_rank_above_leaf_edges() {
        let config = Config::default();
        // Four pages in a path; the middle edge lies on the most shortest
        // paths and must sort last.
        let comp = simple_component(
            &[("en", 1, None), ("de", 2, None), ("fr", 3, None), ("pl", 4, None)],
            &[
                (("en", 1), ("de", 2)),
                (("de", 2), ("fr", 3)),
                (("fr", 3), ("pl", 4)),
            ],
            &config,
        );
        let dense = DenseComponent::new(&comp);
        let sources: Vec<usize> = (0..dense.node_count()).collect();
        let order = edge_betweenness(&dense, &HashSet::new(), &sources);
        let middle = comp
            .core_links()
            .iter()
            .position(|(a, b)| a.to_string() == "de:2" && b.to_string() == "fr:3")
            .unwrap();
        assert_eq!(*order.last().unwrap(), middle);
    }

    #[test]
    fn single_shot_solves_the_five_page_scenario() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let mut calc = BetweennessCalculator::new(&config);
        assert_eq!(calc.process(&mut comp).unwrap(), ProcessOutcome::Completed);
        assert_five_page_outcome(&comp);
    }

    #[test]
    fn newman_girvan_solves_the_five_page_scenario() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let mut calc = NewmanGirvanCalculator::new(&config, CancelFlag::new());
        assert_eq!(calc.process(&mut comp).unwrap(), ProcessOutcome::Completed);
        assert_five_page_outcome(&comp);
    }

    #[test]
    fn cancellation_discards_the_search() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut calc = NewmanGirvanCalculator::new(&config, cancel);
        assert_eq!(calc.process(&mut comp).unwrap(), ProcessOutcome::Cancelled);
        // Partition is back at (or still in) the singleton state.
        let clusters: HashSet<u32> = comp.clusters().values().copied().collect();
        assert_eq!(clusters.len(), comp.core_pages().len());
    }

    #[test]
    fn bad_pages_shrink_as_edges_are_removed() {
        let config = Config::default();
        let comp = incoherent_five(&config);
        let dense = DenseComponent::new(&comp);
        // With every edge intact the whole component is one bad cluster.
        assert_eq!(bad_pages(&dense, &HashSet::new()).len(), 5);
        // Cutting en:1's links to de:3 and fr:5 separates a coherent pair.
        let ignored: HashSet<usize> = comp
            .core_links()
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| {
                (a.to_string() == "de:3" && b.to_string() == "en:1")
                    || (a.to_string() == "en:1" && b.to_string() == "fr:5")
            })
            .map(|(e, _)| e)
            .collect();
        assert!(bad_pages(&dense, &ignored).is_empty());
    }
}
