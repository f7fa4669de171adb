use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use interwiki_analyzer::cluster::{
    self, BetweennessCalculator, CancelFlag, CliquesCalculator, GeneticCalculator,
    MeaningCalculator, NewmanGirvanCalculator, RandomBaseline,
};
use interwiki_analyzer::config::Config;
use interwiki_analyzer::data;
use interwiki_analyzer::index::{ComponentFinder, OverlayKind};
use interwiki_analyzer::layout;
use interwiki_analyzer::repo::MemoryRepository;

#[derive(Parser, Debug)]
#[clap(
    name = "interwiki-analyzer",
    about = "Connected-component and coherence analysis of interwiki link graphs"
)]
struct Cli {
    /// Path to the JSON store
    #[clap(long, default_value = "interwiki-store.json")]
    store: PathBuf,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a corpus and discover its connected components
    FindComponents {
        /// Pages, one JSON record per line
        #[clap(long)]
        pages: PathBuf,

        /// Redirect pairs, one JSON record per line
        #[clap(long)]
        redirects: Option<PathBuf>,

        /// Language-link pairs, one JSON record per line
        #[clap(long)]
        langlinks: PathBuf,

        /// Page-category pairs, enables category-based weighting later
        #[clap(long)]
        categories: Option<PathBuf>,

        /// Page-outlink pairs, enables outlink-based weighting later
        #[clap(long)]
        outlinks: Option<PathBuf>,

        /// Union/find structure backing the discovery
        #[clap(long, value_enum, default_value = "linked")]
        overlay: OverlayKind,
    },

    /// Restore coherence of incoherent components
    Cluster {
        #[clap(long, value_enum)]
        algorithm: Algorithm,

        /// Skip components too large to process in reasonable time
        #[clap(long)]
        skip_large: bool,

        /// Weigh every edge 1 instead of link multiplicity
        #[clap(long)]
        flat_weights: bool,

        /// Boost edge weights by shared category counts
        #[clap(long)]
        common_categories: bool,

        /// Boost edge weights by shared outlink counts
        #[clap(long)]
        common_outlinks: bool,

        /// Only process components with at least this many pages
        #[clap(long)]
        min_size: Option<usize>,

        /// Only process components with fewer pages than this
        #[clap(long)]
        max_size: Option<usize>,

        /// Seed for the randomized algorithms
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Report random-order cut costs without storing anything
    Baseline {
        #[clap(long, default_value = "10")]
        trials: usize,

        #[clap(long)]
        skip_large: bool,

        #[clap(long)]
        min_size: Option<usize>,

        #[clap(long)]
        max_size: Option<usize>,

        #[clap(long)]
        seed: Option<u64>,
    },

    /// Compute 2D page positions for one component
    Layout {
        /// Component id
        #[clap(long)]
        component: String,

        #[clap(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Algorithm {
    Betweenness,
    NewmanGirvan,
    Cliques,
    Genetic,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    match args.command {
        Command::FindComponents {
            pages,
            redirects,
            langlinks,
            categories,
            outlinks,
            overlay,
        } => {
            let mut repo = MemoryRepository::new();
            data::load_corpus(
                &mut repo,
                &pages,
                redirects.as_deref(),
                &langlinks,
                categories.as_deref(),
                outlinks.as_deref(),
            )?;
            let stats = ComponentFinder::new(&mut repo).run(overlay)?;
            log::info!(
                "Discovered {} components ({} incoherent) over {} pages",
                stats.components,
                stats.incoherent,
                stats.pages
            );
            repo.save(&args.store)?;
        }

        Command::Cluster {
            algorithm,
            skip_large,
            flat_weights,
            common_categories,
            common_outlinks,
            min_size,
            max_size,
            seed,
        } => {
            let config = Config {
                flat_weights,
                common_categories,
                common_outlinks,
                min_component_size: min_size,
                max_component_size: max_size,
                seed,
                ..Config::default()
            };
            let cancel = CancelFlag::new();
            let mut calc: Box<dyn MeaningCalculator> = match algorithm {
                Algorithm::Betweenness => Box::new(BetweennessCalculator::new(&config)),
                Algorithm::NewmanGirvan => {
                    Box::new(NewmanGirvanCalculator::new(&config, cancel.clone()))
                }
                Algorithm::Cliques => Box::new(CliquesCalculator::new(&config)),
                Algorithm::Genetic => Box::new(GeneticCalculator::new(&config, cancel.clone())),
            };
            let mut repo = MemoryRepository::load(&args.store)?;
            let stored = cluster::process_all(&mut repo, calc.as_mut(), &config, skip_large)?;
            log::info!("Stored meanings for {} components", stored);
            repo.save(&args.store)?;
        }

        Command::Baseline {
            trials,
            skip_large,
            min_size,
            max_size,
            seed,
        } => {
            let config = Config {
                baseline_trials: trials,
                min_component_size: min_size,
                max_component_size: max_size,
                seed,
                ..Config::default()
            };
            let mut repo = MemoryRepository::load(&args.store)?;
            let mut baseline = RandomBaseline::new(&config);
            cluster::process_all(&mut repo, &mut baseline, &config, skip_large)?;
        }

        Command::Layout { component, seed } => {
            let config = Config {
                seed,
                ..Config::default()
            };
            let mut repo = MemoryRepository::load(&args.store)?;
            let energy = layout::layout_component(&mut repo, &component, &config)?;
            log::info!("Layout of {} settled at energy {:.2}", component, energy);
            repo.save(&args.store)?;
        }
    }

    Ok(())
}
