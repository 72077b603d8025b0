//! Stack growth for deep recursion.
//!
//! Two shapes recurse once per level: the intern trie (one level per tuple
//! position, so a 100k-item tuple is a 100k-deep path) and nested tuples
//! (formatting `(((…)))`). Walks over either wrap each recursive step in
//! [`ensure_sufficient_stack`].
//!
//! - **Red zone**: 100KB. Below this much remaining stack, grow.
//! - **Growth size**: 1MB per growth.

/// Minimum stack space to keep available (100KB red zone).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
