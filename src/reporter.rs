//! Epoch Reporter - one combined metric line per validated epoch

use crate::callback::Callback;
use crate::error::Result;
use crate::host::{TrainerState, TRAIN_LOSS_KEY, VAL_LOSS_KEY};

/// Training loss carried from train-epoch-end to validation-epoch-end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetricSnapshot {
    /// Epoch the loss was aggregated for.
    pub epoch: u64,
    /// Average training loss of that epoch.
    pub train_loss: f64,
}

/// Render the per-epoch line with 7 fractional digits.
///
/// Diverged values print as `nan`, `inf` and `-inf`.
#[must_use]
pub fn format_epoch_line(epoch: u64, lr: f64, train_loss: f64, val_loss: f64) -> String {
    format!(
        "Epoch {epoch}: Lr: {} | Train Loss: {} | Vali Loss: {}",
        fixed7(lr),
        fixed7(train_loss),
        fixed7(val_loss)
    )
}

fn fixed7(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value.is_sign_negative() { "-inf" } else { "inf" }.to_string()
    } else {
        format!("{value:.7}")
    }
}

/// Logs learning rate, training loss and validation loss once per epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochReporter {
    snapshot: Option<EpochMetricSnapshot>,
}

impl EpochReporter {
    /// Create a reporter with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The training-loss snapshot awaiting validation, if any.
    #[must_use]
    pub const fn snapshot(&self) -> Option<EpochMetricSnapshot> {
        self.snapshot
    }

    /// Capture the epoch's training loss; nothing is logged at INFO.
    pub fn record_train_epoch(&mut self, trainer: &dyn TrainerState) {
        let epoch = trainer.current_epoch();
        self.snapshot = trainer
            .metric(TRAIN_LOSS_KEY)
            .map(|train_loss| EpochMetricSnapshot { epoch, train_loss });
        if self.snapshot.is_none() {
            tracing::warn!(epoch, "train epoch ended without '{TRAIN_LOSS_KEY}' metric");
        }
    }

    /// Emit the combined line for the current epoch and return it.
    ///
    /// Returns `None` when no training loss was captured for this epoch, or
    /// when the host has no learning rate or validation loss to report.
    /// The snapshot is consumed either way.
    pub fn report_validation(&mut self, trainer: &dyn TrainerState) -> Option<String> {
        let epoch = trainer.current_epoch();
        let snapshot = self.snapshot.take().filter(|s| s.epoch == epoch)?;

        let Some(lr) = trainer.learning_rate() else {
            tracing::warn!(epoch, "no optimizer learning rate; skipping epoch line");
            return None;
        };
        let Some(val_loss) = trainer.metric(VAL_LOSS_KEY) else {
            tracing::warn!(epoch, "validation ended without '{VAL_LOSS_KEY}' metric");
            return None;
        };

        let line = format_epoch_line(epoch, lr, snapshot.train_loss, val_loss);
        tracing::info!("{line}");
        Some(line)
    }
}

impl Callback for EpochReporter {
    fn name(&self) -> &str {
        "EpochReporter"
    }

    fn on_train_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.record_train_epoch(trainer);
        Ok(())
    }

    fn on_validation_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.report_validation(trainer);
        Ok(())
    }
}
