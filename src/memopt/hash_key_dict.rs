//! Hashed-key map with explicit collision bookkeeping

use super::{IntIntDict, IntSet};
use crate::error::{AnalysisError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// How lookups behave once a key hash has collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Colliding hashes read as absent.
    Permissive,
    /// Colliding hashes fail with [`AnalysisError::HashCollision`] so the
    /// caller can fall back to an exact-key path.
    Strict,
}

/// A map from arbitrary string keys to u32 values that stores only the
/// 32-bit hash of each key.
///
/// When an existing hash is reassigned a *different* value, the entry is
/// deleted and the hash is flagged as colliding; from then on the hash is
/// either invisible or poisonous depending on the policy. This trades a
/// detectable correctness risk for not storing full keys at all.
#[derive(Debug, Clone)]
pub struct HashKeyDict {
    policy: CollisionPolicy,
    entries: IntIntDict,
    collisions: IntSet,
}

/// Stable 32-bit hash of a key (fixed-key SipHash, identical across runs
/// within one build).
pub fn hash_of(key: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish() as u32
}

impl HashKeyDict {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            entries: IntIntDict::new(),
            collisions: IntSet::new(),
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CollisionPolicy) {
        self.policy = policy;
    }

    fn check(&self, hash: u32) -> Result<()> {
        if self.policy == CollisionPolicy::Strict && self.collisions.contains(hash) {
            return Err(AnalysisError::HashCollision { hash });
        }
        Ok(())
    }

    pub fn insert(&mut self, key: &str, value: u32) {
        self.insert_hashed(hash_of(key), value);
    }

    /// Insert by pre-computed hash. A re-insert with the same value is a
    /// no-op; a different value retires the entry and flags the hash.
    pub fn insert_hashed(&mut self, hash: u32, value: u32) {
        match self.entries.get(hash) {
            Some(current) if current != value => {
                self.entries.remove(hash);
                self.collisions.insert(hash);
            }
            Some(_) => {}
            None => {
                self.entries.insert(hash, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<u32>> {
        self.get_hashed(hash_of(key))
    }

    pub fn get_hashed(&self, hash: u32) -> Result<Option<u32>> {
        self.check(hash)?;
        Ok(self.entries.get(hash))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        let hash = hash_of(key);
        self.check(hash)?;
        Ok(self.entries.contains_key(hash))
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<u32>> {
        let hash = hash_of(key);
        self.check(hash)?;
        Ok(self.entries.remove(hash))
    }

    /// Whether the key's hash has been flagged as colliding, regardless of
    /// policy.
    pub fn is_collision(&self, key: &str) -> bool {
        self.collisions.contains(hash_of(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_inserts_behave_like_a_map() {
        let mut dict = HashKeyDict::new(CollisionPolicy::Permissive);
        dict.insert("en:14", 3);
        dict.insert("de:99", 4);
        assert_eq!(dict.get("en:14").unwrap(), Some(3));
        assert_eq!(dict.get("de:99").unwrap(), Some(4));
        assert_eq!(dict.get("fr:1").unwrap(), None);
        // Re-inserting the same value is not a collision.
        dict.insert("en:14", 3);
        assert_eq!(dict.get("en:14").unwrap(), Some(3));
        assert!(!dict.is_collision("en:14"));
    }

    #[test]
    fn permissive_collision_reads_as_absent() {
        let mut dict = HashKeyDict::new(CollisionPolicy::Permissive);
        dict.insert_hashed(42, 1);
        dict.insert_hashed(42, 2);
        assert_eq!(dict.get_hashed(42).unwrap(), None);
        assert_eq!(dict.len(), 0);
        assert!(dict.collisions.contains(42));
    }

    #[test]
    fn strict_collision_is_an_error_for_both_keys() {
        let mut dict = HashKeyDict::new(CollisionPolicy::Strict);
        dict.insert_hashed(42, 1);
        assert_eq!(dict.get_hashed(42).unwrap(), Some(1));
        dict.insert_hashed(42, 2);
        // Both colliding keys now surface the same distinguishable error.
        assert_eq!(
            dict.get_hashed(42),
            Err(AnalysisError::HashCollision { hash: 42 })
        );
        assert_eq!(
            dict.get_hashed(42),
            Err(AnalysisError::HashCollision { hash: 42 })
        );
    }

    #[test]
    fn policy_switch_changes_visibility() {
        let mut dict = HashKeyDict::new(CollisionPolicy::Permissive);
        dict.insert_hashed(7, 1);
        dict.insert_hashed(7, 9);
        assert_eq!(dict.get_hashed(7).unwrap(), None);
        dict.set_policy(CollisionPolicy::Strict);
        assert!(dict.get_hashed(7).is_err());
    }
}
