//! Host contract - the run state a training loop exposes to its hooks
//!
//! Hooks never own training state. The host (trainer) advances epochs,
//! aggregates metrics and picks the best checkpoint; hooks only read it
//! through [`TrainerState`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Aggregated metrics for the current epoch, keyed by metric name.
pub type MetricMap = BTreeMap<String, f64>;

/// Metric key under which the host publishes the epoch's average training loss.
pub const TRAIN_LOSS_KEY: &str = "train/total_loss";

/// Metric key under which the host publishes the epoch's validation loss.
pub const VAL_LOSS_KEY: &str = "val_loss";

/// Rank of the process designated to perform shared filesystem writes.
pub const COORDINATOR_RANK: usize = 0;

/// Read-only view of the host's shared run state.
pub trait TrainerState {
    /// Global rank of this process in a distributed run.
    fn global_rank(&self) -> usize;

    /// Whether this process is the designated writer.
    fn is_coordinator(&self) -> bool {
        self.global_rank() == COORDINATOR_RANK
    }

    /// Zero-based index of the current epoch.
    fn current_epoch(&self) -> u64;

    /// Metrics aggregated by the host for the current epoch.
    fn callback_metrics(&self) -> &MetricMap;

    /// Learning rate of the first parameter group of the first optimizer.
    fn learning_rate(&self) -> Option<f64>;

    /// Path of the checkpoint the host currently considers best.
    fn best_model_path(&self) -> Option<&Path>;

    /// Look up a single metric by name.
    fn metric(&self, key: &str) -> Option<f64> {
        self.callback_metrics().get(key).copied()
    }
}

/// Owned snapshot of a host's run state.
///
/// Hosts that keep their own state can implement [`TrainerState`] directly;
/// `RunState` serves hosts that push values in between lifecycle events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    global_rank: usize,
    current_epoch: u64,
    metrics: MetricMap,
    learning_rate: Option<f64>,
    best_model_path: Option<PathBuf>,
}

impl RunState {
    /// Create the state of the coordinator process at epoch 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a run state with optional fields.
    #[must_use]
    pub fn builder() -> RunStateBuilder {
        RunStateBuilder::default()
    }

    /// Move to the given epoch, clearing the previous epoch's metrics.
    pub fn begin_epoch(&mut self, epoch: u64) {
        self.current_epoch = epoch;
        self.metrics.clear();
    }

    /// Record an aggregated metric for the current epoch.
    pub fn log_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    /// Update the learning rate reported by the optimizer.
    pub fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = Some(lr);
    }

    /// Point at a new best checkpoint.
    pub fn set_best_model_path(&mut self, path: impl Into<PathBuf>) {
        self.best_model_path = Some(path.into());
    }
}

impl TrainerState for RunState {
    fn global_rank(&self) -> usize {
        self.global_rank
    }

    fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    fn callback_metrics(&self) -> &MetricMap {
        &self.metrics
    }

    fn learning_rate(&self) -> Option<f64> {
        self.learning_rate
    }

    fn best_model_path(&self) -> Option<&Path> {
        self.best_model_path.as_deref()
    }
}

/// Builder for `RunState`.
#[derive(Debug, Default)]
pub struct RunStateBuilder {
    state: RunState,
}

impl RunStateBuilder {
    /// Set the process rank.
    #[must_use]
    pub const fn global_rank(mut self, rank: usize) -> Self {
        self.state.global_rank = rank;
        self
    }

    /// Set the current epoch.
    #[must_use]
    pub const fn epoch(mut self, epoch: u64) -> Self {
        self.state.current_epoch = epoch;
        self
    }

    /// Add an aggregated metric.
    #[must_use]
    pub fn metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.state.metrics.insert(key.into(), value);
        self
    }

    /// Set the optimizer learning rate.
    #[must_use]
    pub const fn learning_rate(mut self, lr: f64) -> Self {
        self.state.learning_rate = Some(lr);
        self
    }

    /// Set the best checkpoint path.
    #[must_use]
    pub fn best_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state.best_model_path = Some(path.into());
        self
    }

    /// Build the `RunState`.
    #[must_use]
    pub fn build(self) -> RunState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_coordinator() {
        let state = RunState::new();
        assert!(state.is_coordinator());
        assert_eq!(state.current_epoch(), 0);
        assert!(state.learning_rate().is_none());
        assert!(state.best_model_path().is_none());
    }

    #[test]
    fn test_non_zero_rank_is_not_coordinator() {
        let state = RunState::builder().global_rank(3).build();
        assert!(!state.is_coordinator());
    }

    #[test]
    fn test_begin_epoch_clears_metrics() {
        let mut state = RunState::builder()
            .epoch(1)
            .metric(TRAIN_LOSS_KEY, 0.7)
            .build();
        assert_eq!(state.metric(TRAIN_LOSS_KEY), Some(0.7));

        state.begin_epoch(2);
        assert_eq!(state.current_epoch(), 2);
        assert!(state.metric(TRAIN_LOSS_KEY).is_none());
    }
}
