//! In-memory repository
//!
//! Holds a full corpus in RAM and persists to a single JSON file between
//! pipeline stages. Doubles as the test stand-in for a relational store.

use crate::component::{PageKey, PageRecord};
use crate::error::{AnalysisError, Result};
use crate::memopt::{CollisionPolicy, HashKeyDict};
use crate::repo::{ComponentId, MeaningId, Repository};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub members: Vec<PageKey>,
    pub coherent: bool,
    /// Non-redirect page count.
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeaningRecord {
    pub id: MeaningId,
    pub members: Vec<PageKey>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryRepository {
    pages: HashMap<PageKey, PageRecord>,
    redirects: Vec<(PageKey, PageKey)>,
    langlinks: Vec<(PageKey, PageKey)>,
    #[serde(default)]
    categories: HashMap<PageKey, HashSet<String>>,
    #[serde(default)]
    outlinks: HashMap<PageKey, HashSet<String>>,
    components: BTreeMap<ComponentId, ComponentInfo>,
    /// authority → component → meanings
    meanings: HashMap<String, HashMap<ComponentId, Vec<MeaningRecord>>>,
    positions: HashMap<ComponentId, HashMap<PageKey, (f64, f64, f64)>>,
    /// (lang, namespace) → hashed title → page id. Rebuilt on load, never
    /// persisted.
    #[serde(skip)]
    title_cache: HashMap<String, HashKeyDict>,
}

fn cache_slot(lang: &str, namespace: i32) -> String {
    format!("{lang}#{namespace}")
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_page(&mut self, record: PageRecord) {
        if let Some(title) = &record.title {
            self.title_cache
                .entry(cache_slot(record.lang(), record.namespace))
                .or_insert_with(|| HashKeyDict::new(CollisionPolicy::Strict))
                .insert(title, record.key.id);
        }
        self.pages.insert(record.key.clone(), record);
    }

    pub fn insert_redirect(&mut self, from: PageKey, to: PageKey) {
        if let Some(record) = self.pages.get_mut(&from) {
            record.redirect = Some(to.clone());
            self.redirects.push((from, to));
        }
    }

    pub fn insert_lang_link(&mut self, from: PageKey, to: PageKey) {
        self.langlinks.push((from, to));
    }

    pub fn insert_category(&mut self, key: PageKey, category: String) {
        self.categories.entry(key).or_default().insert(category);
    }

    pub fn insert_outlink(&mut self, from: PageKey, target_title: String) {
        self.outlinks.entry(from).or_default().insert(target_title);
    }

    /// Clears redirects whose target is itself a redirect, so one-hop
    /// resolution always reaches a real page.
    pub fn remove_double_redirects(&mut self) {
        let sources: HashSet<PageKey> = self.redirects.iter().map(|(from, _)| from.clone()).collect();
        self.redirects.retain(|(_, to)| !sources.contains(to));
        let keep: HashSet<PageKey> = self.redirects.iter().map(|(from, _)| from.clone()).collect();
        for record in self.pages.values_mut() {
            if record.redirect.is_some() && !keep.contains(&record.key) {
                record.redirect = None;
            }
        }
    }

    /// Looks up a page key by language, namespace, and title through the
    /// hashed-title cache. A detected hash collision falls back to an exact
    /// scan, so the answer is always correct.
    pub fn key_by_title(&self, lang: &str, namespace: i32, title: &str) -> Option<PageKey> {
        let cache = self.title_cache.get(&cache_slot(lang, namespace))?;
        match cache.get(title) {
            Ok(hit) => hit.map(|id| PageKey::new(lang, id)),
            Err(AnalysisError::HashCollision { .. }) => self
                .pages
                .values()
                .find(|r| {
                    r.key.lang == lang
                        && r.namespace == namespace
                        && r.title.as_deref() == Some(title)
                })
                .map(|r| r.key.clone()),
            Err(_) => None,
        }
    }

    fn rebuild_title_cache(&mut self) {
        self.title_cache.clear();
        for record in self.pages.values() {
            if let Some(title) = &record.title {
                self.title_cache
                    .entry(cache_slot(record.lang(), record.namespace))
                    .or_insert_with(|| HashKeyDict::new(CollisionPolicy::Strict))
                    .insert(title, record.key.id);
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, id: &str) -> Option<&ComponentInfo> {
        self.components.get(id)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating store file {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening store file {}", path.display()))?;
        let mut repo: Self = serde_json::from_reader(BufReader::new(file))?;
        repo.rebuild_title_cache();
        Ok(repo)
    }

    fn component_info(&self, id: &str) -> Result<&ComponentInfo> {
        self.components
            .get(id)
            .ok_or_else(|| AnalysisError::ComponentNotFound { id: id.to_string() })
    }
}

impl Repository for MemoryRepository {
    fn get_all_page_keys(&self) -> Result<Vec<PageKey>> {
        Ok(self.pages.keys().cloned().collect())
    }

    fn get_all_redirects(&self) -> Result<Vec<(PageKey, PageKey)>> {
        Ok(self.redirects.clone())
    }

    fn get_all_lang_links(&self) -> Result<Vec<(PageKey, PageKey)>> {
        Ok(self.langlinks.clone())
    }

    fn save_component(
        &mut self,
        id: &str,
        members: &[PageKey],
        coherent: bool,
        size: usize,
    ) -> Result<()> {
        self.components.insert(
            id.to_string(),
            ComponentInfo {
                members: members.to_vec(),
                coherent,
                size,
            },
        );
        Ok(())
    }

    fn get_incoherent(
        &self,
        lower: Option<usize>,
        upper: Option<usize>,
    ) -> Result<Vec<ComponentId>> {
        Ok(self
            .components
            .iter()
            .filter(|(_, info)| !info.coherent)
            .filter(|(_, info)| lower.map_or(true, |bound| info.size >= bound))
            .filter(|(_, info)| upper.map_or(true, |bound| info.size < bound))
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn get_component_pages(&self, id: &str) -> Result<HashMap<PageKey, PageRecord>> {
        let info = self.component_info(id)?;
        let mut result = HashMap::with_capacity(info.members.len());
        for key in &info.members {
            let record = self
                .pages
                .get(key)
                .ok_or_else(|| AnalysisError::PageNotFound {
                    key: key.to_string(),
                })?;
            result.insert(key.clone(), record.clone());
        }
        Ok(result)
    }

    fn get_component_lang_links(&self, id: &str) -> Result<Vec<(PageKey, PageKey)>> {
        let info = self.component_info(id)?;
        let members: HashSet<&PageKey> = info.members.iter().collect();
        Ok(self
            .langlinks
            .iter()
            .filter(|(from, to)| members.contains(from) && members.contains(to))
            .cloned()
            .collect())
    }

    fn count_common_categories(&self, a: &PageKey, b: &PageKey) -> Result<u32> {
        let common = match (self.categories.get(a), self.categories.get(b)) {
            (Some(ca), Some(cb)) => ca.intersection(cb).count(),
            _ => 0,
        };
        Ok(common as u32)
    }

    fn count_common_outlinks(&self, a: &PageKey, b: &PageKey) -> Result<u32> {
        let common = match (self.outlinks.get(a), self.outlinks.get(b)) {
            (Some(la), Some(lb)) => la.intersection(lb).count(),
            _ => 0,
        };
        Ok(common as u32)
    }

    fn delete_page_meanings(&mut self, authority: &str, component: &str) -> Result<()> {
        if let Some(by_component) = self.meanings.get_mut(authority) {
            by_component.remove(component);
        }
        Ok(())
    }

    fn insert_page_meanings(
        &mut self,
        authority: &str,
        meaning: &str,
        component: &str,
        members: &[PageKey],
    ) -> Result<()> {
        self.meanings
            .entry(authority.to_string())
            .or_default()
            .entry(component.to_string())
            .or_default()
            .push(MeaningRecord {
                id: meaning.to_string(),
                members: members.to_vec(),
            });
        Ok(())
    }

    fn get_component_page_meanings(
        &self,
        component: &str,
        authority: &str,
    ) -> Result<HashMap<PageKey, MeaningId>> {
        let mut result = HashMap::new();
        if let Some(records) = self
            .meanings
            .get(authority)
            .and_then(|by_component| by_component.get(component))
        {
            for record in records {
                for key in &record.members {
                    result.insert(key.clone(), record.id.clone());
                }
            }
        }
        Ok(result)
    }

    fn delete_page_positions(&mut self, component: &str) -> Result<()> {
        self.positions.remove(component);
        Ok(())
    }

    fn insert_page_position(
        &mut self,
        key: &PageKey,
        component: &str,
        position: (f64, f64, f64),
    ) -> Result<()> {
        self.positions
            .entry(component.to_string())
            .or_default()
            .insert(key.clone(), position);
        Ok(())
    }

    fn get_component_page_positions(
        &self,
        component: &str,
    ) -> Result<HashMap<PageKey, (f64, f64, f64)>> {
        Ok(self.positions.get(component).cloned().unwrap_or_default())
    }
}
