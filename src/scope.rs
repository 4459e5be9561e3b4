//! Persistent resolution of binder names to de Bruijn indices.
//!
//! A `Scope` records, for every name, the level (distance from the outermost binder)
//! of its innermost binding. Levels are stored in hash blocks that merge when a new
//! block is at least as large as its successor, in the same doubling pattern as
//! [`PStack`](crate::stack::PStack), so a lookup probes a logarithmic number of
//! blocks. A push copies amortized logarithmically many entries when a scope is
//! extended one binder at a time; pushing repeatedly onto one old scope can copy
//! all of it each time, so contexts that branch often build their scope lazily.
use crate::util::{new_fx_hash_map, FxHashMap};
use std::hash::Hash;
use std::sync::Arc;

struct Block<K> {
    levels: FxHashMap<K, usize>,
    /// Number of pushes folded into this block; shadowed names make `levels` smaller.
    pushes: usize,
    next: Option<Arc<Block<K>>>,
}

pub struct Scope<K> {
    blocks: Option<Arc<Block<K>>>,
    depth: usize,
}

impl<K> Clone for Scope<K> {
    fn clone(&self) -> Self { Self { blocks: self.blocks.clone(), depth: self.depth } }
}

impl<K> Default for Scope<K> {
    fn default() -> Self { Self { blocks: None, depth: 0 } }
}

impl<K: Hash + Eq + Clone> Scope<K> {
    pub fn new() -> Self { Self::default() }

    pub fn depth(&self) -> usize { self.depth }

    pub fn is_empty(&self) -> bool { self.depth == 0 }

    /// Introduce a new innermost binder named `key`.
    pub fn push(&self, key: K) -> Self {
        let depth = self.depth + 1;
        let mut levels = new_fx_hash_map();
        levels.insert(key, depth);
        let mut pushes = 1;
        let mut next = self.blocks.clone();
        while let Some(block) = next.clone().filter(|b| b.pushes <= pushes) {
            for (k, level) in block.levels.iter() {
                levels.entry(k.clone()).or_insert(*level);
            }
            pushes += block.pushes;
            next = block.next.clone();
        }
        Self { blocks: Some(Arc::new(Block { levels, pushes, next })), depth }
    }

    /// The de Bruijn index of the innermost binder named `key`, if any.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        let mut cursor = self.blocks.as_ref();
        while let Some(block) = cursor {
            if let Some(level) = block.levels.get(key) {
                return Some(self.depth - level)
            }
            cursor = block.next.as_ref();
        }
        None
    }

    /// Every visible name with its current index.
    pub fn flatten(&self) -> FxHashMap<K, usize> {
        let mut out = new_fx_hash_map();
        let mut cursor = self.blocks.as_ref();
        while let Some(block) = cursor {
            for (k, level) in block.levels.iter() {
                out.entry(k.clone()).or_insert(self.depth - level);
            }
            cursor = block.next.as_ref();
        }
        out
    }
}
