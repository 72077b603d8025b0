//! Intern trie nodes.
//!
//! One node per distinct tuple prefix. A node's children are keyed by the
//! next item (through [`HybridMap`], so reference-type edges are weak), and
//! its terminal slot weakly remembers the tuple whose items spell exactly
//! the path from the root to this node. The terminal slot is a separate
//! field, so no item can collide with it.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::hybrid_map::HybridMap;
use crate::item::Item;
use crate::tuple::TupleInner;

pub(crate) struct TrieNode {
    children: Mutex<HybridMap<Arc<TrieNode>>>,
    terminal: Mutex<Weak<TupleInner>>,
}

/// Edge and terminal counts for a single node.
pub(crate) struct NodeCensus {
    pub weak_edges: usize,
    pub strong_edges: usize,
    pub has_live_tuple: bool,
}

impl TrieNode {
    pub(crate) fn new() -> Self {
        TrieNode {
            children: Mutex::new(HybridMap::new()),
            terminal: Mutex::new(Weak::new()),
        }
    }

    /// Child under `key`, creating it if absent.
    ///
    /// The lookup and the insert happen under one lock, so racing callers
    /// agree on a single child. Returns `true` alongside a freshly created
    /// child.
    pub(crate) fn child_or_insert(&self, key: &Item) -> (Arc<TrieNode>, bool) {
        let mut children = self.children.lock();
        if let Some(child) = children.get(key) {
            return (Arc::clone(child), false);
        }
        let child = children.set(key, Arc::new(TrieNode::new()));
        (Arc::clone(child), true)
    }

    /// The tuple completed at this node, creating it with `make` if the
    /// slot is empty or its tuple has been freed.
    ///
    /// Returns `true` alongside a freshly created tuple.
    pub(crate) fn terminal_or_insert(
        &self,
        make: impl FnOnce() -> TupleInner,
    ) -> (Arc<TupleInner>, bool) {
        let mut slot = self.terminal.lock();
        if let Some(existing) = slot.upgrade() {
            return (existing, false);
        }
        let created = Arc::new(make());
        *slot = Arc::downgrade(&created);
        (created, true)
    }

    /// Prune dead reference-type edges of this node only.
    ///
    /// Returns the number of edges pruned and the surviving children.
    pub(crate) fn sweep_edges(&self) -> (usize, Vec<Arc<TrieNode>>) {
        let mut children = self.children.lock();
        let pruned = children.sweep();
        (pruned, children.values().cloned().collect())
    }

    /// Count this node's edges and check its terminal slot.
    ///
    /// Returns the counts and every child, including those under dead edges
    /// that have not been swept yet.
    pub(crate) fn census(&self) -> (NodeCensus, Vec<Arc<TrieNode>>) {
        let has_live_tuple = self.terminal.lock().strong_count() > 0;
        let children = self.children.lock();
        let census = NodeCensus {
            weak_edges: children.weak_len(),
            strong_edges: children.strong_len(),
            has_live_tuple,
        };
        (census, children.all_values().cloned().collect())
    }
}

impl Drop for TrieNode {
    // A long tuple is a long chain of nodes. Tear the chain down iteratively
    // so dropping it cannot overflow the stack.
    fn drop(&mut self) {
        let mut pending = self.children.get_mut().take_values();
        while let Some(child) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(child) {
                pending.extend(node.children.get_mut().take_values());
            }
        }
    }
}
