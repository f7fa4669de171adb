//! Sorted block-partitioned integer-keyed map

use super::BLOCK_BITS;
use std::collections::BTreeMap;
use std::mem;

/// A u32 → u32 map with the same blocking strategy as `IntSet`, except each
/// block stores interleaved key/value pairs: pair `p` occupies indices
/// `2p` and `2p + 1`.
#[derive(Debug, Clone, Default)]
pub struct IntIntDict {
    blocks: BTreeMap<u32, Vec<u32>>,
}

impl IntIntDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block index and pair position where `key` lives or would be inserted.
    fn position(&self, key: u32) -> (u32, Result<usize, usize>) {
        let high = key >> BLOCK_BITS;
        match self.blocks.get(&high) {
            Some(block) => {
                let pairs = block.len() / 2;
                let (mut lo, mut hi) = (0usize, pairs);
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    let probe = block[2 * mid];
                    if probe == key {
                        return (high, Ok(mid));
                    }
                    if probe < key {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                (high, Err(lo))
            }
            None => (high, Err(0)),
        }
    }

    /// Inserts or overwrites. Returns the previous value if any.
    pub fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        let (high, pos) = self.position(key);
        let block = self.blocks.entry(high).or_default();
        match pos {
            Ok(pair) => Some(mem::replace(&mut block[2 * pair + 1], value)),
            Err(pair) => {
                block.splice(2 * pair..2 * pair, [key, value]);
                None
            }
        }
    }

    pub fn get(&self, key: u32) -> Option<u32> {
        let (high, pos) = self.position(key);
        match pos {
            Ok(pair) => Some(self.blocks[&high][2 * pair + 1]),
            Err(_) => None,
        }
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.position(key).1.is_ok()
    }

    /// Removes a key. Returns its value if it was present.
    pub fn remove(&mut self, key: u32) -> Option<u32> {
        let (high, pos) = self.position(key);
        match pos {
            Ok(pair) => {
                let block = self.blocks.get_mut(&high).unwrap();
                let value = block[2 * pair + 1];
                block.drain(2 * pair..2 * pair + 2);
                if block.is_empty() {
                    self.blocks.remove(&high);
                }
                Some(value)
            }
            Err(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.values().map(|b| b.len() / 2).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.blocks
            .values()
            .flat_map(|b| b.chunks_exact(2).map(|pair| (pair[0], pair[1])))
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
