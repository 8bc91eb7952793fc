//! Fit progress logging.
//!
//! Thin wrapper over the `log` facade so training emits through whatever
//! logger the host process installed. `Silent` (the default) emits nothing,
//! keeping request-path refits quiet unless the deployment opts in.

/// How much fit progress to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Start/finish summary lines at `info` level.
    Info,
    /// Per-tree lines at `debug` level, plus everything from `Info`.
    Debug,
}

/// Logger handed through the trainer.
#[derive(Debug, Clone, Copy)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn start_training(&self, n_trees: usize, n_samples: usize) {
        if self.verbosity >= Verbosity::Info {
            log::info!("fitting {n_trees} trees on {n_samples} samples");
        }
    }

    pub fn tree_grown(&self, tree_index: u32, n_nodes: usize) {
        if self.verbosity >= Verbosity::Debug {
            log::debug!("tree {tree_index}: {n_nodes} nodes");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.verbosity >= Verbosity::Info {
            log::info!("fit complete: {n_trees} trees");
        }
    }
}
