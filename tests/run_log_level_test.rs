//! The run log level is fixed at INFO whatever `RUST_LOG` says
//!
//! Kept in its own binary: the environment is set before the global
//! subscriber is created.

use tempfile::TempDir;
use trainer_hooks::{
    Callback, EpochReporter, RunConfiguration, RunIdentity, RunSetup, RunState, TRAIN_LOSS_KEY,
    VAL_LOSS_KEY,
};

#[test]
fn test_rust_log_does_not_filter_run_log() {
    std::env::set_var("RUST_LOG", "warn");

    let temp = TempDir::new().unwrap();
    let artifacts = RunSetup::builder(
        RunIdentity::new("train", "20240101_120000"),
        temp.path().join("exp"),
        temp.path().join("exp").join("checkpoints"),
        RunConfiguration::default(),
    )
    .build()
    .prepare(true)
    .unwrap()
    .unwrap();

    let mut reporter = EpochReporter::new();
    let mut state = RunState::builder()
        .epoch(3)
        .learning_rate(0.001)
        .metric(TRAIN_LOSS_KEY, 0.512_345_6)
        .build();
    reporter.on_train_epoch_end(&state).unwrap();
    state.log_metric(VAL_LOSS_KEY, 0.498_765_4);
    reporter.on_validation_epoch_end(&state).unwrap();
    tracing::debug!("debug-detail");

    let log = std::fs::read_to_string(artifacts.log_path).unwrap();
    assert!(log.contains("Environment info:"));
    assert!(log.contains("Epoch 3: Lr: 0.0010000 | Train Loss: 0.5123456 | Vali Loss: 0.4987654"));
    assert!(!log.contains("debug-detail"));
}
