//! In-memory model of one connected component under analysis

use crate::component::{PageKey, PageRecord};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::repo::Repository;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stable identifier of one cluster within a component's partition.
pub type ClusterId = u32;

/// One component's pages, redirect-folded links, edge weights, and a
/// mutable cluster partition.
///
/// The partition upholds a single invariant: no cluster ever contains two
/// non-redirect pages of the same language. All mutation goes through
/// [`Component::merge`], which enforces it.
#[derive(Debug)]
pub struct Component {
    id: String,
    pages: HashMap<PageKey, PageRecord>,
    /// Raw links as loaded; kept so weights can be recomputed.
    links: Vec<(PageKey, PageKey)>,
    /// Non-redirect member pages, sorted.
    core_pages: Vec<PageKey>,
    /// Redirect-resolved simple edges, canonical (smaller key first),
    /// sorted. The position of an edge here is its discovery order.
    core_links: Vec<(PageKey, PageKey)>,
    /// Edge weights, parallel to `core_links`.
    weights: Vec<f64>,
    edge_index: HashMap<(PageKey, PageKey), usize>,
    clusters: HashMap<PageKey, ClusterId>,
    cluster_langs: HashMap<ClusterId, HashSet<String>>,
    cut: HashSet<usize>,
}

impl Component {
    /// Builds the analysis model from raw component data. Multigraph links
    /// collapse into simple weighted edges; weights carry multiplicity but
    /// no similarity boosts yet (see [`Component::update_weights`]).
    pub fn new(
        id: impl Into<String>,
        pages: HashMap<PageKey, PageRecord>,
        links: Vec<(PageKey, PageKey)>,
        config: &Config,
    ) -> Result<Self> {
        let mut core_pages: Vec<PageKey> = pages
            .values()
            .filter(|record| !record.is_redirect())
            .map(|record| record.key.clone())
            .collect();
        core_pages.sort();

        let mut accumulated: BTreeMap<(PageKey, PageKey), f64> = BTreeMap::new();
        for link in &links {
            if let Some((edge, via_redirect)) = resolve_link(&pages, link)? {
                let weight = if via_redirect {
                    config.weight_redirect
                } else {
                    config.weight_normal
                };
                *accumulated.entry(edge).or_insert(0.0) += weight;
            }
        }

        let mut core_links = Vec::with_capacity(accumulated.len());
        let mut weights = Vec::with_capacity(accumulated.len());
        let mut edge_index = HashMap::with_capacity(accumulated.len());
        for (edge, weight) in accumulated {
            edge_index.insert(edge.clone(), core_links.len());
            core_links.push(edge);
            weights.push(weight);
        }

        let mut component = Self {
            id: id.into(),
            pages,
            links,
            core_pages,
            core_links,
            weights,
            edge_index,
            clusters: HashMap::new(),
            cluster_langs: HashMap::new(),
            cut: HashSet::new(),
        };
        component.init_clusters();
        Ok(component)
    }

    /// Recomputes edge weights, optionally boosted by shared-category and
    /// shared-outlink counts from the store.
    pub fn update_weights(&mut self, repo: &dyn Repository, config: &Config) -> Result<()> {
        let mut weights = vec![0.0; self.core_links.len()];

        if config.common_categories || config.common_outlinks {
            for (idx, (a, b)) in self.core_links.iter().enumerate() {
                if config.common_categories {
                    let common = repo.count_common_categories(a, b)?;
                    weights[idx] += config.factor_category * (common as f64).sqrt();
                }
                if config.common_outlinks {
                    let common = repo.count_common_outlinks(a, b)?;
                    weights[idx] += config.factor_outlink * (1.0 + common as f64).ln();
                }
            }
        }

        for link in &self.links.clone() {
            if let Some((edge, via_redirect)) = resolve_link(&self.pages, link)? {
                let idx = self.edge_index[&edge];
                weights[idx] += if via_redirect {
                    config.weight_redirect
                } else {
                    config.weight_normal
                };
            }
        }

        self.weights = weights;
        Ok(())
    }

    /// Sets every edge weight to 1, discarding multiplicity and boosts.
    pub fn reset_weights(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 1.0);
    }

    /// Resets the partition to one singleton cluster per core page. Every
    /// clustering algorithm starts from this state.
    pub fn init_clusters(&mut self) {
        self.clusters.clear();
        self.cluster_langs.clear();
        self.cut.clear();
        for (ci, key) in self.core_pages.iter().enumerate() {
            let ci = ci as ClusterId;
            self.clusters.insert(key.clone(), ci);
            self.cluster_langs
                .insert(ci, HashSet::from([key.lang.clone()]));
        }
    }

    /// True iff the clusters are distinct and their resident-language sets
    /// are disjoint.
    pub fn mergeable(&self, a: ClusterId, b: ClusterId) -> bool {
        if a == b {
            return false;
        }
        match (self.cluster_langs.get(&a), self.cluster_langs.get(&b)) {
            (Some(la), Some(lb)) => la.is_disjoint(lb),
            _ => false,
        }
    }

    /// Merges cluster `b` into cluster `a`, retiring `b`'s id. Merging a
    /// cluster with itself is a no-op; merging two clusters that share a
    /// language fails and leaves both unchanged.
    pub fn merge(&mut self, a: ClusterId, b: ClusterId) -> Result<()> {
        if a == b {
            return Ok(());
        }
        let langs_a = &self.cluster_langs[&a];
        let langs_b = &self.cluster_langs[&b];
        if let Some(shared) = langs_a.intersection(langs_b).next() {
            return Err(AnalysisError::ClusterConflict {
                a,
                b,
                lang: shared.clone(),
            });
        }
        for ci in self.clusters.values_mut() {
            if *ci == b {
                *ci = a;
            }
        }
        let absorbed = self.cluster_langs.remove(&b).unwrap();
        self.cluster_langs.get_mut(&a).unwrap().extend(absorbed);
        Ok(())
    }

    /// Materializes a candidate cut: replays `init_clusters` and merges
    /// along every core edge not in the cut.
    pub fn set_cut(&mut self, cut: HashSet<usize>) -> Result<()> {
        self.init_clusters();
        for idx in 0..self.core_links.len() {
            if cut.contains(&idx) {
                continue;
            }
            let (a, b) = self.core_links[idx].clone();
            let (ca, cb) = (self.clusters[&a], self.clusters[&b]);
            self.merge(ca, cb)?;
        }
        self.cut = cut;
        Ok(())
    }

    /// Recomputes which core edges cross clusters in the current partition.
    pub fn crossing_edges(&self) -> HashSet<usize> {
        self.core_links
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| self.clusters[a] != self.clusters[b])
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Total weight of the given edge set.
    pub fn cut_cost(&self, cut: &HashSet<usize>) -> f64 {
        cut.iter().map(|&idx| self.weights[idx]).sum()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pages(&self) -> &HashMap<PageKey, PageRecord> {
        &self.pages
    }

    pub fn record(&self, key: &PageKey) -> Option<&PageRecord> {
        self.pages.get(key)
    }

    pub fn core_pages(&self) -> &[PageKey] {
        &self.core_pages
    }

    pub fn core_links(&self) -> &[(PageKey, PageKey)] {
        &self.core_links
    }

    pub fn endpoints(&self, edge: usize) -> (&PageKey, &PageKey) {
        let (a, b) = &self.core_links[edge];
        (a, b)
    }

    pub fn weight(&self, edge: usize) -> f64 {
        self.weights[edge]
    }

    pub fn cluster_of(&self, key: &PageKey) -> ClusterId {
        self.clusters[key]
    }

    pub fn clusters(&self) -> &HashMap<PageKey, ClusterId> {
        &self.clusters
    }

    pub fn cluster_langs(&self, cluster: ClusterId) -> Option<&HashSet<String>> {
        self.cluster_langs.get(&cluster)
    }

    pub fn cut(&self) -> &HashSet<usize> {
        &self.cut
    }
}

/// Resolves a raw link into a canonical core edge: redirect endpoints fold
/// into their final targets, the smaller key goes first, and self-loops
/// vanish. Returns whether either endpoint went through a redirect.
fn resolve_link(
    pages: &HashMap<PageKey, PageRecord>,
    (from, to): &(PageKey, PageKey),
) -> Result<Option<((PageKey, PageKey), bool)>> {
    let mut via_redirect = false;
    let mut resolve = |key: &PageKey| -> Result<PageKey> {
        let mut current = key.clone();
        let mut visited = HashSet::new();
        loop {
            let record = pages
                .get(&current)
                .ok_or_else(|| AnalysisError::PageNotFound {
                    key: current.to_string(),
                })?;
            let Some(target) = &record.redirect else {
                return Ok(current);
            };
            via_redirect = true;
            // A redirect cycle never reaches a real page.
            if !visited.insert(current.clone()) {
                return Err(AnalysisError::PageNotFound {
                    key: current.to_string(),
                });
            }
            current = target.clone();
        }
    };

    let a = resolve(from)?;
    let b = resolve(to)?;
    if a == b {
        return Ok(None);
    }
    let edge = if a < b { (a, b) } else { (b, a) };
    Ok(Some((edge, via_redirect)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::testutil::{incoherent_five, simple_component};

    #[test]
    fn redirects_fold_and_edges_canonicalize() {
        let config = Config::default();
        let comp = simple_component(
            &[("en", 1, None), ("de", 2, None), ("de", 9, Some(("de", 2)))],
            &[(("en", 1), ("de", 9)), (("de", 2), ("en", 1))],
            &config,
        );
        assert_eq!(comp.core_pages().len(), 2);
        // Both raw links collapse onto the same canonical edge.
        assert_eq!(comp.core_links().len(), 1);
        let (a, b) = comp.endpoints(0);
        assert_eq!((a.to_string().as_str(), b.to_string().as_str()), ("de:2", "en:1"));
        // One normal link plus one through a redirect.
        assert!((comp.weight(0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn redirect_chains_resolve_to_the_final_target() {
        let config = Config::default();
        // de:2 -> de:3 -> de:4; the link through the chain must land on the
        // real page, not on the intermediate redirect.
        let comp = simple_component(
            &[
                ("en", 1, None),
                ("de", 2, Some(("de", 3))),
                ("de", 3, Some(("de", 4))),
                ("de", 4, None),
            ],
            &[(("en", 1), ("de", 2))],
            &config,
        );
        assert_eq!(comp.core_pages().len(), 2);
        assert_eq!(comp.core_links().len(), 1);
        let (a, b) = comp.endpoints(0);
        assert_eq!(
            (a.to_string().as_str(), b.to_string().as_str()),
            ("de:4", "en:1")
        );
        assert!((comp.weight(0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn redirect_cycles_are_lookup_errors() {
        let config = Config::default();
        let mut records = HashMap::new();
        for (lang, id, redirect) in [
            ("en", 1, None),
            ("de", 2, Some(PageKey::new("de", 3))),
            ("de", 3, Some(PageKey::new("de", 2))),
        ] {
            let key = PageKey::new(lang, id);
            records.insert(
                key.clone(),
                PageRecord {
                    key,
                    namespace: 0,
                    title: None,
                    redirect,
                },
            );
        }
        let links = vec![(PageKey::new("en", 1), PageKey::new("de", 2))];
        let err = Component::new("cyclic", records, links, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::PageNotFound { .. }));
    }

    #[test]
    fn merge_conflict_leaves_clusters_unchanged() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let de2 = comp.cluster_of(&PageKey::new("de", 2));
        let de3 = comp.cluster_of(&PageKey::new("de", 3));
        assert!(!comp.mergeable(de2, de3));
        let before = comp.clusters().clone();
        let err = comp.merge(de2, de3).unwrap_err();
        assert!(matches!(err, AnalysisError::ClusterConflict { .. }));
        assert_eq!(comp.clusters(), &before);
        assert_eq!(comp.cluster_langs(de2).unwrap().len(), 1);
        assert_eq!(comp.cluster_langs(de3).unwrap().len(), 1);
    }

    #[test]
    fn merge_unions_languages_and_retires_id() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let en1 = comp.cluster_of(&PageKey::new("en", 1));
        let de2 = comp.cluster_of(&PageKey::new("de", 2));
        assert!(comp.mergeable(en1, de2));
        comp.merge(en1, de2).unwrap();
        assert_eq!(comp.cluster_of(&PageKey::new("de", 2)), en1);
        assert_eq!(comp.cluster_langs(en1).unwrap().len(), 2);
        assert!(comp.cluster_langs(de2).is_none());
    }

    #[test]
    fn cut_round_trips_through_the_partition() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        // Cut en:1-de:3 and en:1-fr:5; the rest merges into two clusters.
        let cut: HashSet<usize> = comp
            .core_links()
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| {
                let pair = (a.to_string(), b.to_string());
                pair == ("de:3".into(), "en:1".into()) || pair == ("en:1".into(), "fr:5".into())
            })
            .map(|(idx, _)| idx)
            .collect();
        assert_eq!(cut.len(), 2);
        comp.set_cut(cut.clone()).unwrap();
        assert_eq!(comp.crossing_edges(), cut);
        assert!((comp.cut_cost(&cut) - 2.0).abs() < 1e-9);

        let ids: HashSet<ClusterId> = comp.clusters().values().copied().collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn similarity_boosts_need_store_data() {
        let config = Config {
            common_categories: true,
            common_outlinks: true,
            ..Config::default()
        };
        let mut comp = incoherent_five(&config);
        let before: Vec<f64> = (0..comp.core_links().len()).map(|e| comp.weight(e)).collect();
        // An empty store contributes zero to every boost.
        comp.update_weights(&crate::repo::NullRepository, &config)
            .unwrap();
        let after: Vec<f64> = (0..comp.core_links().len()).map(|e| comp.weight(e)).collect();
        assert_eq!(before, after);

        comp.reset_weights();
        assert!((0..comp.core_links().len()).all(|e| comp.weight(e) == 1.0));
    }

    #[test]
    fn init_clusters_restores_singletons() {
        let config = Config::default();
        let mut comp = incoherent_five(&config);
        let en1 = comp.cluster_of(&PageKey::new("en", 1));
        let fr4 = comp.cluster_of(&PageKey::new("fr", 4));
        comp.merge(en1, fr4).unwrap();
        comp.init_clusters();
        let ids: HashSet<ClusterId> = comp.clusters().values().copied().collect();
        assert_eq!(ids.len(), comp.core_pages().len());
        for key in comp.core_pages() {
            let langs = comp.cluster_langs(comp.cluster_of(key)).unwrap();
            assert_eq!(langs, &HashSet::from([key.lang.clone()]));
        }
    }
}
