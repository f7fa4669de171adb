//! Repository contract for corpus data and analysis results
//!
//! The analysis core reads and writes through this narrow interface; what
//! backs it (an in-memory store here, a relational store elsewhere) is the
//! collaborator's concern.

pub mod memory;
pub mod null;

pub use memory::MemoryRepository;
pub use null::NullRepository;

use crate::component::{PageKey, PageRecord};
use crate::error::Result;
use std::collections::HashMap;

/// Identifier of a discovered component (a UUIDv5 string).
pub type ComponentId = String;

/// Identifier of one stored meaning (a UUIDv5 string).
pub type MeaningId = String;

pub trait Repository {
    /// All page keys in the corpus, for component discovery.
    fn get_all_page_keys(&self) -> Result<Vec<PageKey>>;

    /// All redirect pairs (source, target).
    fn get_all_redirects(&self) -> Result<Vec<(PageKey, PageKey)>>;

    /// All language-link pairs (source, target).
    fn get_all_lang_links(&self) -> Result<Vec<(PageKey, PageKey)>>;

    /// Records one discovered component.
    fn save_component(
        &mut self,
        id: &str,
        members: &[PageKey],
        coherent: bool,
        size: usize,
    ) -> Result<()>;

    /// Ids of incoherent components whose non-redirect size falls within
    /// `[lower, upper)`, in deterministic order.
    fn get_incoherent(
        &self,
        lower: Option<usize>,
        upper: Option<usize>,
    ) -> Result<Vec<ComponentId>>;

    fn get_component_pages(&self, id: &str) -> Result<HashMap<PageKey, PageRecord>>;

    fn get_component_lang_links(&self, id: &str) -> Result<Vec<(PageKey, PageKey)>>;

    /// Number of categories shared by two pages (similarity signal).
    fn count_common_categories(&self, a: &PageKey, b: &PageKey) -> Result<u32>;

    /// Number of outgoing links shared by two pages (similarity signal).
    fn count_common_outlinks(&self, a: &PageKey, b: &PageKey) -> Result<u32>;

    /// Drops all meanings an authority stored for a component.
    fn delete_page_meanings(&mut self, authority: &str, component: &str) -> Result<()>;

    /// Stores one meaning (cluster) of a component under an authority tag,
    /// so results from different algorithms coexist.
    fn insert_page_meanings(
        &mut self,
        authority: &str,
        meaning: &str,
        component: &str,
        members: &[PageKey],
    ) -> Result<()>;

    fn get_component_page_meanings(
        &self,
        component: &str,
        authority: &str,
    ) -> Result<HashMap<PageKey, MeaningId>>;

    fn delete_page_positions(&mut self, component: &str) -> Result<()>;

    fn insert_page_position(
        &mut self,
        key: &PageKey,
        component: &str,
        position: (f64, f64, f64),
    ) -> Result<()>;

    fn get_component_page_positions(
        &self,
        component: &str,
    ) -> Result<HashMap<PageKey, (f64, f64, f64)>>;
}
