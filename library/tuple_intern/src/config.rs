//! Registry configuration.

/// Default minimum number of newly created trie nodes between automatic
/// sweeps.
pub const DEFAULT_SWEEP_INTERVAL: usize = 4096;

/// Tuning knobs for a [`Registry`](crate::Registry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Sweep dead reference-type edges after at least this many new trie
    /// nodes. Once the trie outgrows the interval, automatic sweeps wait
    /// for as many new nodes as the previous sweep visited.
    ///
    /// `0` disables automatic sweeping; call
    /// [`Registry::sweep`](crate::Registry::sweep) yourself.
    pub sweep_interval: usize,
}

impl RegistryConfig {
    /// Configuration with automatic sweeping turned off.
    pub const fn manual() -> Self {
        RegistryConfig { sweep_interval: 0 }
    }

    #[must_use]
    pub const fn with_sweep_interval(mut self, sweep_interval: usize) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// True if the registry sweeps on its own.
    pub const fn auto_sweeps(&self) -> bool {
        self.sweep_interval > 0
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
