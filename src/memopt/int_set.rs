//! Sorted block-partitioned integer set

use super::BLOCK_BITS;
use std::collections::BTreeMap;
use std::mem;

/// A set of u32 values stored as sorted dense arrays, one per high-bit block.
///
/// Membership, insertion, and removal binary-search within the target block,
/// so the cost is that of a sparse sorted array rather than a hash table.
#[derive(Debug, Clone, Default)]
pub struct IntSet {
    blocks: BTreeMap<u32, Vec<u32>>,
}

impl IntSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block index and position within the block where `elem` lives or
    /// would be inserted.
    fn position(&self, elem: u32) -> (u32, Result<usize, usize>) {
        let high = elem >> BLOCK_BITS;
        match self.blocks.get(&high) {
            Some(block) => (high, block.binary_search(&elem)),
            None => (high, Err(0)),
        }
    }

    /// Adds an element. Returns false if it was already present.
    pub fn insert(&mut self, elem: u32) -> bool {
        let (high, pos) = self.position(elem);
        match pos {
            Ok(_) => false,
            Err(at) => {
                self.blocks.entry(high).or_default().insert(at, elem);
                true
            }
        }
    }

    /// Removes an element. Returns false if it was absent.
    pub fn remove(&mut self, elem: u32) -> bool {
        let (high, pos) = self.position(elem);
        match pos {
            Ok(at) => {
                let block = self.blocks.get_mut(&high).unwrap();
                block.remove(at);
                if block.is_empty() {
                    self.blocks.remove(&high);
                }
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, elem: u32) -> bool {
        self.position(elem).1.is_ok()
    }

    pub fn len(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.blocks.values().flatten().copied()
    }

    /// Estimate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let blocks: usize = self
            .blocks
            .values()
            .map(|b| b.capacity() * mem::size_of::<u32>())
            .sum();
        base + blocks
    }
}

impl FromIterator<u32> for IntSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::new();
        for elem in iter {
            set.insert(elem);
        }
        set
    }
}
