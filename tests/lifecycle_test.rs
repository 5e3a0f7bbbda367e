//! End-to-end run on the coordinator: all three hooks registered with one host

use tempfile::TempDir;
use trainer_hooks::setup::CONFIG_FILE_NAME;
use trainer_hooks::{
    BestArtifactMirror, Callback, CallbackList, EpochReporter, RunConfiguration, RunIdentity,
    RunSetup, RunState, BEST_CHECKPOINT_NAME, TRAIN_LOSS_KEY, VAL_LOSS_KEY,
};

struct HostCheckpoint;

impl Callback for HostCheckpoint {
    fn name(&self) -> &str {
        "HostCheckpoint"
    }
}

#[test]
fn test_full_coordinator_run() {
    let temp = TempDir::new().unwrap();
    let results = temp.path().join("work_dirs").join("mmnist");
    let ckpt_dir = results.join("checkpoints");

    let config = RunConfiguration::from_serializable(&serde_json::json!({
        "dataname": "mmnist",
        "epoch": 3,
        "lr": 0.001
    }))
    .unwrap();
    let setup = RunSetup::builder(RunIdentity::new("train", "20240301_101500"), &results, &ckpt_dir, config)
        .build();

    let mut callbacks = CallbackList::new()
        .with(setup)
        .with(EpochReporter::new())
        .with(BestArtifactMirror::new(HostCheckpoint));
    assert_eq!(callbacks.len(), 3);

    let mut state = RunState::builder().learning_rate(0.001).build();
    callbacks.fit_start(&state).unwrap();
    assert!(ckpt_dir.is_dir());

    let losses = [(0.9, 0.8), (0.6, 0.5), (0.55, 0.52)];
    let mut best_epoch = 0;
    let mut best_val = f64::INFINITY;
    for (epoch, &(train, val)) in (0u64..).zip(losses.iter()) {
        state.begin_epoch(epoch);
        state.log_metric(TRAIN_LOSS_KEY, train);
        callbacks.train_epoch_end(&state).unwrap();

        // Host-side checkpoint selection
        state.log_metric(VAL_LOSS_KEY, val);
        let path = ckpt_dir.join(format!("epoch={epoch}.ckpt"));
        std::fs::write(&path, format!("weights-{epoch}")).unwrap();
        if val < best_val {
            best_val = val;
            best_epoch = epoch;
            state.set_best_model_path(&path);
        }
        callbacks.validation_epoch_end(&state).unwrap();
    }
    callbacks.test_end(&state).unwrap();

    assert_eq!(best_epoch, 1);
    assert_eq!(
        std::fs::read_to_string(ckpt_dir.join(BEST_CHECKPOINT_NAME)).unwrap(),
        "weights-1"
    );
    assert!(ckpt_dir.join("epoch=1.ckpt").exists());

    let log = std::fs::read_to_string(results.join("train_20240301_101500.log")).unwrap();
    assert!(log.contains("Epoch 0: Lr: 0.0010000 | Train Loss: 0.9000000 | Vali Loss: 0.8000000"));
    assert!(log.contains("Epoch 1: Lr: 0.0010000 | Train Loss: 0.6000000 | Vali Loss: 0.5000000"));
    assert!(log.contains("Epoch 2: Lr: 0.0010000 | Train Loss: 0.5500000 | Vali Loss: 0.5200000"));
    assert!(log.contains("dataname: mmnist"));

    let dumped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(results.join(CONFIG_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(dumped["epoch"], serde_json::json!(3));
}
