//! # trainer-hooks: Lifecycle Hooks for Training Loops
//!
//! Callbacks a training host invokes at fit-start, train-epoch-end,
//! validation-epoch-end and test-end. The host owns the loop, the optimizer,
//! rank coordination and checkpoint selection; these hooks only read its
//! state through [`TrainerState`] and perform file and logging side effects.
//!
//! - [`RunSetup`]: directories, run log, environment report and
//!   configuration dump, once, on the coordinator.
//! - [`EpochReporter`]: one `Epoch N: Lr | Train Loss | Vali Loss` line per
//!   validated epoch.
//! - [`BestArtifactMirror`]: copies the host's best checkpoint to a stable
//!   `best.ckpt`, on the coordinator.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trainer_hooks::{
//!     BestArtifactMirror, Callback, CallbackList, EpochReporter, RunConfiguration, RunIdentity,
//!     RunSetup, RunState,
//! };
//!
//! struct HostCheckpoint;
//!
//! impl Callback for HostCheckpoint {
//!     fn name(&self) -> &str {
//!         "HostCheckpoint"
//!     }
//! }
//!
//! let config = RunConfiguration::from_serializable(&serde_json::json!({ "lr": 0.001 }))?;
//! let setup = RunSetup::builder(
//!     RunIdentity::now("train"),
//!     "work_dirs/exp",
//!     "work_dirs/exp/checkpoints",
//!     config,
//! )
//! .build();
//!
//! let mut callbacks = CallbackList::new()
//!     .with(setup)
//!     .with(EpochReporter::new())
//!     .with(BestArtifactMirror::new(HostCheckpoint));
//!
//! let state = RunState::new();
//! callbacks.fit_start(&state)?;
//! # Ok::<(), trainer_hooks::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod callback;
pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod identity;
pub mod logging;
pub mod mirror;
pub mod reporter;
pub mod setup;

pub use callback::{Callback, CallbackList, LifecycleEvent};
pub use config::RunConfiguration;
pub use env::EnvReport;
pub use error::{Error, Result};
pub use host::{MetricMap, RunState, RunStateBuilder, TrainerState, TRAIN_LOSS_KEY, VAL_LOSS_KEY};
pub use identity::RunIdentity;
pub use mirror::{BestArtifactMirror, MirroredArtifact, BEST_CHECKPOINT_NAME};
pub use reporter::{EpochMetricSnapshot, EpochReporter};
pub use setup::{ModelInfo, RunSetup, RunSetupBuilder, SetupArtifacts};
