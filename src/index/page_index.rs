//! Dense per-language page index

use crate::component::PageKey;
use crate::error::{AnalysisError, Result};
use crate::index::overlay::ComponentOverlay;
use crate::memopt::IntSet;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Collects page keys before indexing. Consumed by [`PageIndexBuilder::build`],
/// so no query can run against an unfinished index.
#[derive(Debug, Default)]
pub struct PageIndexBuilder {
    ids_by_lang: BTreeMap<String, Vec<u32>>,
}

impl PageIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, key: &PageKey) {
        self.ids_by_lang
            .entry(key.lang.clone())
            .or_default()
            .push(key.id);
    }

    /// Sorts and deduplicates every language block and computes cumulative
    /// offsets. The dense index of a page is its offset within its
    /// language's block plus that language's offset.
    pub fn build(self) -> PageIndex {
        let mut langs = Vec::with_capacity(self.ids_by_lang.len());
        let mut ids = Vec::with_capacity(self.ids_by_lang.len());
        let mut offsets = Vec::with_capacity(self.ids_by_lang.len());
        let mut lang_index = HashMap::with_capacity(self.ids_by_lang.len());
        let mut size = 0usize;
        for (lang, mut block) in self.ids_by_lang {
            block.sort_unstable();
            block.dedup();
            lang_index.insert(lang.clone(), langs.len());
            offsets.push(size);
            size += block.len();
            langs.push(lang);
            ids.push(block);
        }
        PageIndex {
            langs,
            ids,
            offsets,
            size,
            lang_index,
            redirects: IntSet::new(),
        }
    }
}

/// Immutable page index: per-language sorted id blocks plus a redirect-flag
/// overlay. Pairs with a [`ComponentOverlay`] for union/find.
pub struct PageIndex {
    langs: Vec<String>,
    ids: Vec<Vec<u32>>,
    offsets: Vec<usize>,
    size: usize,
    lang_index: HashMap<String, usize>,
    /// Dense indices of redirect pages; sparse relative to the corpus.
    redirects: IntSet,
}

/// One discovered component, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSummary {
    /// Deterministic id derived from the sorted member key list.
    pub id: String,
    /// Member keys in lexicographic order of their serialized form.
    pub members: Vec<PageKey>,
    /// True iff no language contributes more than one non-redirect page.
    pub coherent: bool,
    /// Non-redirect page count.
    pub size: usize,
}

impl PageIndex {
    /// Number of indexed pages.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Dense index of a page, by binary search within its language block.
    pub fn index_of(&self, key: &PageKey) -> Result<usize> {
        let not_found = || AnalysisError::PageNotFound {
            key: key.to_string(),
        };
        let lang = *self.lang_index.get(&key.lang).ok_or_else(not_found)?;
        let within = self.ids[lang].binary_search(&key.id).map_err(|_| not_found())?;
        Ok(self.offsets[lang] + within)
    }

    /// Inverse of [`PageIndex::index_of`].
    pub fn key_at(&self, index: usize) -> PageKey {
        let lang = self.offsets.partition_point(|&offset| offset <= index) - 1;
        PageKey::new(
            self.langs[lang].clone(),
            self.ids[lang][index - self.offsets[lang]],
        )
    }

    pub fn lang_at(&self, index: usize) -> &str {
        let lang = self.offsets.partition_point(|&offset| offset <= index) - 1;
        &self.langs[lang]
    }

    pub fn mark_redirect(&mut self, index: usize) {
        self.redirects.insert(index as u32);
    }

    pub fn is_redirect(&self, index: usize) -> bool {
        self.redirects.contains(index as u32)
    }

    /// Deterministic component id: UUIDv5 over the serialized member keys,
    /// sorted, joined by `#`. Depends only on the member set.
    pub fn component_id(sorted_keys: &[String]) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, sorted_keys.join("#").as_bytes()).to_string()
    }

    /// Enumerates non-singleton components from the overlay's partition.
    /// Components with exactly one non-redirect page are skipped: a page
    /// with no cross-language counterpart is not analyzed.
    pub fn enumerate_components(&self, overlay: &dyn ComponentOverlay) -> Vec<ComponentSummary> {
        let mut result = Vec::new();
        for group in overlay.groups() {
            let mut entries: Vec<(String, PageKey)> = Vec::with_capacity(group.len());
            let mut langs_seen = HashSet::new();
            let mut coherent = true;
            let mut core_count = 0usize;
            for &node in &group {
                let key = self.key_at(node);
                if !self.is_redirect(node) {
                    core_count += 1;
                    if !langs_seen.insert(key.lang.clone()) {
                        coherent = false;
                    }
                }
                entries.push((key.to_string(), key));
            }
            if core_count <= 1 {
                continue;
            }
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            let (serialized, members): (Vec<String>, Vec<PageKey>) = entries.into_iter().unzip();
            result.push(ComponentSummary {
                id: Self::component_id(&serialized),
                members,
                coherent,
                size: core_count,
            });
        }
        result
    }
}
