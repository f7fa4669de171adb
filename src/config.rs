//! Configuration for the interwiki graph analyzer

/// Tunable parameters shared by the clustering algorithms and the driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// Weight contributed by one ordinary language link.
    pub weight_normal: f64,

    /// Weight contributed by one link that went through a redirect.
    pub weight_redirect: f64,

    /// Multiplier for the sqrt(common categories) similarity boost.
    pub factor_category: f64,

    /// Multiplier for the ln(1 + common outlinks) similarity boost.
    pub factor_outlink: f64,

    /// Fetch common-category counts when weighting edges.
    pub common_categories: bool,

    /// Fetch common-outlink counts when weighting edges.
    pub common_outlinks: bool,

    /// Reset every edge weight to 1 (ignore multiplicity and boosts).
    pub flat_weights: bool,

    /// First-pass group size threshold for the cliques algorithm.
    pub clique_theta: usize,

    /// Genetic algorithm: population size per generation.
    pub ga_population: usize,

    /// Genetic algorithm: fresh random individuals injected per generation.
    pub ga_random_quota: usize,

    /// Genetic algorithm: per-offspring swap mutation probability.
    pub ga_mutation: f64,

    /// Genetic algorithm: stop after this many generations without
    /// improvement of the best-ever fitness.
    pub ga_stagnation: usize,

    /// Genetic algorithm: hard cap on generations.
    pub ga_max_generations: usize,

    /// Number of trials for the random baseline.
    pub baseline_trials: usize,

    /// Lower bound (inclusive) on component core size when selecting work.
    pub min_component_size: Option<usize>,

    /// Upper bound (exclusive) on component core size when selecting work.
    pub max_component_size: Option<usize>,

    /// Seed for the stochastic algorithms; None draws from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weight_normal: 1.0,
            weight_redirect: 0.1,
            factor_category: 0.8,
            factor_outlink: 0.2,
            common_categories: false,
            common_outlinks: false,
            flat_weights: false,
            clique_theta: 5,
            ga_population: 100,
            ga_random_quota: 10,
            ga_mutation: 0.05,
            ga_stagnation: 5,
            ga_max_generations: 1000,
            baseline_trials: 10,
            min_component_size: None,
            max_component_size: None,
            seed: None,
        }
    }
}

/// Components with at least this many core pages are skipped when the
/// `--skip-large` switch is active.
pub const LARGE_COMPONENT_LIMIT: usize = 300;
