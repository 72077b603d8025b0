//! The intern registry: a trie of [`HybridMap`](crate::HybridMap) nodes that
//! resolves an item sequence to its canonical [`Tuple`].
//!
//! # Interning
//!
//! Starting at the root, each item selects (or creates) the child node
//! labelled with it; after the last item, the node's terminal slot holds the
//! tuple for exactly that sequence. The empty sequence resolves to the
//! root's own terminal slot. Order matters: `(1, 2)` and `(2, 1)` walk
//! different paths.
//!
//! # Thread Safety
//!
//! Every node guards its children with its own `Mutex`, and the
//! get-or-create step for a child runs under that lock. The terminal slot
//! has a second lock with the same discipline. Racing threads interning the
//! same sequence therefore always meet at one node and one tuple.
//!
//! # Memory
//!
//! - Terminal slots hold their tuple weakly: the registry never keeps a
//!   tuple, or anything the tuple references, alive.
//! - Edges labelled with reference-type items (objects, nested tuples) hold
//!   their label weakly. Once the label is gone the edge is dead, and the
//!   next sweep drops it together with the whole subtree beneath it.
//! - Edges labelled with value-type items are kept forever. A value has no
//!   moment at which it becomes unreachable, so there is nothing to prune
//!   on. Growth is bounded by the number of distinct value prefixes ever
//!   interned, which is tolerable for reasonable workloads but is not zero.
//!
//! Sweeping runs on demand through [`Registry::sweep`], and automatically
//! once enough new nodes have accumulated: at least
//! [`sweep_interval`](RegistryConfig::sweep_interval) of them, and at least
//! as many as the previous sweep visited. A sweep walks the whole trie, so
//! tying the next one to the trie's size keeps the sweeping cost amortized
//! constant per created node even when the trie only grows.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::RegistryConfig;
use crate::item::Item;
use crate::stack::ensure_sufficient_stack;
use crate::trie::TrieNode;
use crate::tuple::{Tuple, TupleInner};

/// The process-wide registry behind [`tuple`](crate::tuple()) and
/// [`tuple!`](crate::tuple!). Created on first use, never torn down.
static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Monotonic counters. Relaxed ordering throughout: these are statistics,
/// nothing synchronizes on them.
#[derive(Default)]
struct Counters {
    nodes_created: AtomicUsize,
    tuples_created: AtomicUsize,
    sweeps: AtomicUsize,
    edges_pruned: AtomicUsize,
    sweep_nodes_visited: AtomicUsize,
    /// Nodes created since the last automatic sweep.
    nodes_since_sweep: AtomicUsize,
    /// New nodes needed before the next automatic sweep.
    sweep_due: AtomicUsize,
}

struct RegistryInner {
    root: Arc<TrieNode>,
    config: RegistryConfig,
    counters: Counters,
}

/// Snapshot of a registry's lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub nodes_created: usize,
    pub tuples_created: usize,
    pub sweeps: usize,
    pub edges_pruned: usize,
    /// Nodes visited, summed over every sweep so far.
    pub sweep_nodes_visited: usize,
}

/// What a full walk of the trie found, right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryCensus {
    /// Allocated trie nodes, root included. Nodes under dead edges count
    /// until a sweep drops them.
    pub nodes: usize,
    /// Reference-type edges, including dead ones not yet swept.
    pub weak_edges: usize,
    pub strong_edges: usize,
    /// Terminal slots whose tuple is still alive.
    pub live_tuples: usize,
}

/// Result of one [`Registry::sweep`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub nodes_visited: usize,
    pub edges_pruned: usize,
}

/// Handle to an intern registry. Cloning shares the same trie.
///
/// Canonical identity is per registry: two tuples with equal items are the
/// same instance only if both were interned into the same registry. All
/// public entry points ([`tuple`](crate::tuple()), [`tuple!`](crate::tuple!),
/// [`Registry::global`] and [`Registry::default`]) use the one process-wide
/// registry, and tuples derived from a tuple (`map`, `sort`, `concat`, ...)
/// are interned into its registry, so ordinary code never sees two
/// instances of one sequence.
#[derive(Clone)]
pub struct Registry(Arc<RegistryInner>);

impl Registry {
    /// A private registry with its own trie, statistics and sweep schedule.
    ///
    /// Tuples interned here are never identical to tuples of any other
    /// registry, the global one included, and neither are the tuples
    /// derived from them. Meant for tests and diagnostic tools that need
    /// exact counters; everything else should use [`Registry::global`].
    #[doc(hidden)]
    pub fn isolated(config: RegistryConfig) -> Self {
        let counters = Counters::default();
        counters
            .sweep_due
            .store(config.sweep_interval, Ordering::Relaxed);
        Registry(Arc::new(RegistryInner {
            root: Arc::new(TrieNode::new()),
            config,
            counters,
        }))
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| Registry::isolated(RegistryConfig::default()))
    }

    #[inline]
    pub fn config(&self) -> RegistryConfig {
        self.0.config
    }

    /// True if both handles share one trie.
    #[inline]
    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Intern `items`, returning the canonical tuple for that sequence.
    pub fn intern(&self, items: Vec<Item>) -> Tuple {
        let mut node = Arc::clone(&self.0.root);
        let mut new_nodes = 0;
        for item in &items {
            let (child, created) = node.child_or_insert(item);
            new_nodes += usize::from(created);
            node = child;
        }

        let len = items.len();
        let registry = self.clone();
        let (inner, created) = node.terminal_or_insert(move || TupleInner::new(items, registry));
        if created {
            self.0.counters.tuples_created.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(len, new_nodes, "interned new tuple");
        }
        if new_nodes > 0 {
            self.note_new_nodes(new_nodes);
        }
        Tuple(inner)
    }

    /// Intern anything convertible to items.
    pub fn tuple<I>(&self, items: I) -> Tuple
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.intern(items.into_iter().map(Into::into).collect())
    }

    /// Prune every dead reference-type edge, and the subtree beneath it.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        walk(&self.0.root, &mut |node| {
            let (pruned, children) = node.sweep_edges();
            report.nodes_visited += 1;
            report.edges_pruned += pruned;
            children
        });

        let counters = &self.0.counters;
        counters.sweeps.fetch_add(1, Ordering::Relaxed);
        counters
            .edges_pruned
            .fetch_add(report.edges_pruned, Ordering::Relaxed);
        counters
            .sweep_nodes_visited
            .fetch_add(report.nodes_visited, Ordering::Relaxed);
        counters.sweep_due.store(
            report.nodes_visited.max(self.0.config.sweep_interval),
            Ordering::Relaxed,
        );
        tracing::debug!(
            nodes_visited = report.nodes_visited,
            edges_pruned = report.edges_pruned,
            "swept intern trie"
        );
        report
    }

    /// Walk the trie and count what is in it.
    pub fn census(&self) -> RegistryCensus {
        let mut census = RegistryCensus::default();
        walk(&self.0.root, &mut |node| {
            let (node_census, children) = node.census();
            census.nodes += 1;
            census.weak_edges += node_census.weak_edges;
            census.strong_edges += node_census.strong_edges;
            census.live_tuples += usize::from(node_census.has_live_tuple);
            children
        });
        census
    }

    pub fn stats(&self) -> RegistryStats {
        let counters = &self.0.counters;
        RegistryStats {
            nodes_created: counters.nodes_created.load(Ordering::Relaxed),
            tuples_created: counters.tuples_created.load(Ordering::Relaxed),
            sweeps: counters.sweeps.load(Ordering::Relaxed),
            edges_pruned: counters.edges_pruned.load(Ordering::Relaxed),
            sweep_nodes_visited: counters.sweep_nodes_visited.load(Ordering::Relaxed),
        }
    }

    /// Count freshly created nodes and sweep once enough have accumulated.
    ///
    /// "Enough" is the larger of the configured interval and the node count
    /// of the last sweep, so sweep work stays proportional to node creation.
    fn note_new_nodes(&self, count: usize) {
        let counters = &self.0.counters;
        counters.nodes_created.fetch_add(count, Ordering::Relaxed);

        if !self.0.config.auto_sweeps() {
            return;
        }
        let due = counters.sweep_due.load(Ordering::Relaxed);
        let pending = counters.nodes_since_sweep.fetch_add(count, Ordering::Relaxed) + count;
        // The swap lets exactly one of several racing callers run the sweep.
        if pending >= due && counters.nodes_since_sweep.swap(0, Ordering::Relaxed) >= due {
            self.sweep();
        }
    }
}

/// Visit every node reachable from `node`, depth first. `visit` returns the
/// children to descend into.
fn walk(node: &TrieNode, visit: &mut dyn FnMut(&TrieNode) -> Vec<Arc<TrieNode>>) {
    let children = visit(node);
    for child in &children {
        ensure_sufficient_stack(|| walk(child, &mut *visit));
    }
}

/// A handle to the process-wide registry.
impl Default for Registry {
    fn default() -> Self {
        Registry::global().clone()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.0.config)
            .field("stats", &self.stats())
            .finish()
    }
}
