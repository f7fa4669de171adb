//! Union/find overlays over the dense page index
//!
//! Two interchangeable representations of the same partition. The linked
//! overlay is the memory-light production choice; the adjacency overlay is
//! the straightforward BFS formulation the linked one is checked against.

use std::collections::VecDeque;

/// Which overlay backs component discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OverlayKind {
    Linked,
    Adjacency,
}

/// Incremental union of nodes into components, then enumeration of the
/// resulting groups. Unioning already-connected nodes is a no-op.
pub trait ComponentOverlay {
    fn union(&mut self, a: usize, b: usize);

    /// All components as member-index groups, each sorted ascending.
    fn groups(&self) -> Vec<Vec<usize>>;
}

/// Linked-list union-find: `head` points at the representative, `next`
/// chains the members, `tail`/`len` (indexed by representative) make the
/// union weighted and O(1) apart from relabeling the shorter chain.
pub struct LinkedOverlay {
    head: Vec<u32>,
    next: Vec<u32>,
    tail: Vec<u32>,
    len: Vec<u32>,
}

const NIL: u32 = u32::MAX;

impl LinkedOverlay {
    pub fn new(size: usize) -> Self {
        assert!(size < NIL as usize);
        Self {
            head: (0..size as u32).collect(),
            next: vec![NIL; size],
            tail: (0..size as u32).collect(),
            len: vec![1; size],
        }
    }
}

impl ComponentOverlay for LinkedOverlay {
    fn union(&mut self, a: usize, b: usize) {
        let (ha, hb) = (self.head[a], self.head[b]);
        if ha == hb {
            return;
        }
        // Keep the longer chain's representative; relabel the shorter.
        let (keep, absorb) = if self.len[ha as usize] >= self.len[hb as usize] {
            (ha, hb)
        } else {
            (hb, ha)
        };
        self.next[self.tail[keep as usize] as usize] = absorb;
        let mut cursor = absorb;
        while cursor != NIL {
            self.head[cursor as usize] = keep;
            cursor = self.next[cursor as usize];
        }
        self.tail[keep as usize] = self.tail[absorb as usize];
        self.len[keep as usize] += self.len[absorb as usize];
    }

    fn groups(&self) -> Vec<Vec<usize>> {
        let mut result = Vec::new();
        for start in 0..self.head.len() {
            if self.head[start] != start as u32 {
                continue;
            }
            let mut members = Vec::with_capacity(self.len[start] as usize);
            let mut cursor = start as u32;
            while cursor != NIL {
                members.push(cursor as usize);
                cursor = self.next[cursor as usize];
            }
            members.sort_unstable();
            result.push(members);
        }
        result
    }
}

/// Adjacency lists traversed by breadth-first search with a visited-flag
/// array at enumeration time.
pub struct AdjacencyOverlay {
    neighbors: Vec<Vec<u32>>,
}

impl AdjacencyOverlay {
    pub fn new(size: usize) -> Self {
        assert!(size < NIL as usize);
        Self {
            neighbors: vec![Vec::new(); size],
        }
    }
}

impl ComponentOverlay for AdjacencyOverlay {
    fn union(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.neighbors[a].push(b as u32);
        self.neighbors[b].push(a as u32);
    }

    fn groups(&self) -> Vec<Vec<usize>> {
        let size = self.neighbors.len();
        let mut visited = vec![false; size];
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        for start in 0..size {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);
            let mut members = Vec::new();
            while let Some(node) = queue.pop_front() {
                members.push(node);
                for &neighbor in &self.neighbors[node] {
                    if !visited[neighbor as usize] {
                        visited[neighbor as usize] = true;
                        queue.push_back(neighbor as usize);
                    }
                }
            }
            members.sort_unstable();
            result.push(members);
        }
        result
    }
}
