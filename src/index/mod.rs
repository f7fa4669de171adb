//! Dense page indexing and connected-component discovery

pub mod finder;
pub mod overlay;
pub mod page_index;

pub use finder::{ComponentFinder, FinderStats};
pub use overlay::{AdjacencyOverlay, ComponentOverlay, LinkedOverlay, OverlayKind};
pub use page_index::{ComponentSummary, PageIndex, PageIndexBuilder};
