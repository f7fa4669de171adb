//! No-op repository test double

use crate::component::{PageKey, PageRecord};
use crate::error::{AnalysisError, Result};
use crate::repo::{ComponentId, MeaningId, Repository};
use std::collections::HashMap;

/// Accepts every write and answers every read with nothing. Useful when a
/// test exercises an algorithm that must not depend on store contents.
#[derive(Debug, Default)]
pub struct NullRepository;

impl Repository for NullRepository {
    fn get_all_page_keys(&self) -> Result<Vec<PageKey>> {
        Ok(Vec::new())
    }

    fn get_all_redirects(&self) -> Result<Vec<(PageKey, PageKey)>> {
        Ok(Vec::new())
    }

    fn get_all_lang_links(&self) -> Result<Vec<(PageKey, PageKey)>> {
        Ok(Vec::new())
    }

    fn save_component(&mut self, _: &str, _: &[PageKey], _: bool, _: usize) -> Result<()> {
        Ok(())
    }

    fn get_incoherent(&self, _: Option<usize>, _: Option<usize>) -> Result<Vec<ComponentId>> {
        Ok(Vec::new())
    }

    fn get_component_pages(&self, id: &str) -> Result<HashMap<PageKey, PageRecord>> {
        Err(AnalysisError::ComponentNotFound { id: id.to_string() })
    }

    fn get_component_lang_links(&self, id: &str) -> Result<Vec<(PageKey, PageKey)>> {
        Err(AnalysisError::ComponentNotFound { id: id.to_string() })
    }

    fn count_common_categories(&self, _: &PageKey, _: &PageKey) -> Result<u32> {
        Ok(0)
    }

    fn count_common_outlinks(&self, _: &PageKey, _: &PageKey) -> Result<u32> {
        Ok(0)
    }

    fn delete_page_meanings(&mut self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }

    fn insert_page_meanings(&mut self, _: &str, _: &str, _: &str, _: &[PageKey]) -> Result<()> {
        Ok(())
    }

    fn get_component_page_meanings(&self, _: &str, _: &str) -> Result<HashMap<PageKey, MeaningId>> {
        Ok(HashMap::new())
    }

    fn delete_page_positions(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn insert_page_position(&mut self, _: &PageKey, _: &str, _: (f64, f64, f64)) -> Result<()> {
        Ok(())
    }

    fn get_component_page_positions(&self, _: &str) -> Result<HashMap<PageKey, (f64, f64, f64)>> {
        Ok(HashMap::new())
    }
}
