//! Full-corpus component discovery

use crate::component::PageKey;
use crate::error::Result;
use crate::index::overlay::{AdjacencyOverlay, ComponentOverlay, LinkedOverlay, OverlayKind};
use crate::index::page_index::{PageIndex, PageIndexBuilder};
use crate::repo::Repository;

/// Outcome counters for one discovery run.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderStats {
    pub pages: usize,
    pub components: usize,
    pub incoherent: usize,
    /// Redirect or link pairs referencing pages missing from the corpus.
    pub dangling: usize,
}

/// Drives the page index over a repository: ingest pages, union redirects
/// and language links, enumerate components, save each one.
pub struct ComponentFinder<'a, R: Repository> {
    repo: &'a mut R,
}

impl<'a, R: Repository> ComponentFinder<'a, R> {
    pub fn new(repo: &'a mut R) -> Self {
        Self { repo }
    }

    pub fn run(&mut self, kind: OverlayKind) -> Result<FinderStats> {
        log::info!("Loading pages");
        let mut builder = PageIndexBuilder::new();
        let keys = self.repo.get_all_page_keys()?;
        for key in &keys {
            builder.add_page(key);
        }

        log::info!("Indexing {} pages", keys.len());
        let mut index = builder.build();
        let mut overlay: Box<dyn ComponentOverlay> = match kind {
            OverlayKind::Linked => Box::new(LinkedOverlay::new(index.len())),
            OverlayKind::Adjacency => Box::new(AdjacencyOverlay::new(index.len())),
        };

        let mut stats = FinderStats {
            pages: index.len(),
            ..FinderStats::default()
        };

        log::info!("Loading redirects");
        for (from, to) in self.repo.get_all_redirects()? {
            match (index.index_of(&from), index.index_of(&to)) {
                (Ok(fi), Ok(ti)) => {
                    index.mark_redirect(fi);
                    overlay.union(fi, ti);
                }
                _ => {
                    stats.dangling += 1;
                    log::debug!("Dangling redirect {from} -> {to}");
                }
            }
        }

        log::info!("Loading language links");
        for (from, to) in self.repo.get_all_lang_links()? {
            match (index.index_of(&from), index.index_of(&to)) {
                (Ok(fi), Ok(ti)) => overlay.union(fi, ti),
                _ => {
                    stats.dangling += 1;
                    log::debug!("Dangling language link {from} -> {to}");
                }
            }
        }

        log::info!("Finding components");
        for summary in index.enumerate_components(overlay.as_ref()) {
            if !summary.coherent {
                stats.incoherent += 1;
            }
            self.repo
                .save_component(&summary.id, &summary.members, summary.coherent, summary.size)?;
            stats.components += 1;
        }

        log::info!(
            "Saved {} components ({} incoherent, {} dangling pairs skipped)",
            stats.components,
            stats.incoherent,
            stats.dangling
        );
        Ok(stats)
    }
}

/// Convenience used by tests and small tools: run discovery on keys and
/// pairs held in memory, without a repository.
pub fn discover(
    keys: &[PageKey],
    redirects: &[(PageKey, PageKey)],
    langlinks: &[(PageKey, PageKey)],
    kind: OverlayKind,
) -> Result<Vec<crate::index::ComponentSummary>> {
    let mut builder = PageIndexBuilder::new();
    for key in keys {
        builder.add_page(key);
    }
    let mut index = builder.build();
    let mut overlay: Box<dyn ComponentOverlay> = match kind {
        OverlayKind::Linked => Box::new(LinkedOverlay::new(index.len())),
        OverlayKind::Adjacency => Box::new(AdjacencyOverlay::new(index.len())),
    };
    for (from, to) in redirects {
        let fi = index.index_of(from)?;
        let ti = index.index_of(to)?;
        index.mark_redirect(fi);
        overlay.union(fi, ti);
    }
    for (from, to) in langlinks {
        overlay.union(index.index_of(from)?, index.index_of(to)?);
    }
    Ok(index.enumerate_components(overlay.as_ref()))
}
