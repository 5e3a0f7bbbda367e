//! Run Setup - one-time preparation of a run's output tree at fit-start
//!
//! On the coordinator process this:
//!
//! 1. creates the results and checkpoint directories and resolves them to
//!    absolute paths,
//! 2. routes the process log to `{results}/{prefix}_{timestamp}.log`,
//! 3. logs the host's environment report, or a basic one it collects,
//! 4. dumps the configuration to `{results}/model_param.json`,
//! 5. logs the configuration, then the model info and command line if given.
//!
//! Every other rank does nothing.

use std::path::{Path, PathBuf};

use crate::callback::Callback;
use crate::config::RunConfiguration;
use crate::env::EnvReport;
use crate::error::{Error, Result};
use crate::host::TrainerState;
use crate::identity::RunIdentity;
use crate::logging;

/// File name of the configuration dump inside the results directory.
pub const CONFIG_FILE_NAME: &str = "model_param.json";

/// Model statistics logged after the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    description: String,
    flops: String,
    throughput: String,
    separator: String,
}

impl ModelInfo {
    /// Create model info from its four pre-rendered parts.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        flops: impl Into<String>,
        throughput: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            flops: flops.into(),
            throughput: throughput.into(),
            separator: separator.into(),
        }
    }

    /// The block written to the run log.
    #[must_use]
    pub fn framed(&self) -> String {
        format!(
            "Model info:\n{}\n{}\n{}{}",
            self.description, self.flops, self.throughput, self.separator
        )
    }
}

/// Files produced by a coordinator-side setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupArtifacts {
    /// Run log receiving all INFO+ events.
    pub log_path: PathBuf,
    /// JSON dump of the run configuration.
    pub config_path: PathBuf,
}

/// Fit-start hook preparing directories, run log and configuration dump.
#[derive(Debug, Clone)]
pub struct RunSetup {
    identity: RunIdentity,
    results_dir: PathBuf,
    checkpoint_dir: PathBuf,
    config: RunConfiguration,
    model_info: Option<ModelInfo>,
    argv: Option<Vec<String>>,
    env_report: Option<EnvReport>,
}

impl RunSetup {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn builder(
        identity: RunIdentity,
        results_dir: impl Into<PathBuf>,
        checkpoint_dir: impl Into<PathBuf>,
        config: RunConfiguration,
    ) -> RunSetupBuilder {
        RunSetupBuilder {
            setup: Self {
                identity,
                results_dir: results_dir.into(),
                checkpoint_dir: checkpoint_dir.into(),
                config,
                model_info: None,
                argv: None,
                env_report: None,
            },
        }
    }

    /// Get the run identity.
    #[must_use]
    pub const fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Results directory; absolute once setup has run on the coordinator.
    #[must_use]
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Checkpoint directory; absolute once setup has run on the coordinator.
    #[must_use]
    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    /// Get the run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Where the run log is (or will be) written.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.results_dir.join(self.identity.log_file_name())
    }

    /// Where the configuration is (or will be) dumped.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.results_dir.join(CONFIG_FILE_NAME)
    }

    /// Run the setup steps if this process is the designated writer.
    ///
    /// Returns `None` without touching the filesystem or the log sink when
    /// `is_coordinator` is false.
    ///
    /// # Errors
    ///
    /// Directory creation, log file open and configuration write failures
    /// are returned as-is; nothing is retried.
    pub fn prepare(&mut self, is_coordinator: bool) -> Result<Option<SetupArtifacts>> {
        if !is_coordinator {
            return Ok(None);
        }

        self.results_dir = ensure_dir(&self.results_dir)?;
        self.checkpoint_dir = ensure_dir(&self.checkpoint_dir)?;

        let log_path = self.log_path();
        if !logging::install_run_log(&log_path)? {
            tracing::warn!(
                "run log layer not attached to the global subscriber; {} stays empty",
                log_path.display()
            );
        }

        let env = self.env_report.clone().unwrap_or_else(EnvReport::collect);
        tracing::info!("{}", env.framed());

        let config_path = self.config_path();
        self.config.write_json(&config_path)?;
        tracing::info!("{}", self.config.render());

        if let Some(info) = &self.model_info {
            tracing::info!("{}", info.framed());
        }
        if let Some(argv) = &self.argv {
            tracing::info!("Command line: {}", argv.join(" "));
        }

        Ok(Some(SetupArtifacts {
            log_path,
            config_path,
        }))
    }
}

impl Callback for RunSetup {
    fn name(&self) -> &str {
        "RunSetup"
    }

    fn on_fit_start(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.prepare(trainer.is_coordinator()).map(|_| ())
    }
}

/// Builder for `RunSetup`.
#[derive(Debug)]
pub struct RunSetupBuilder {
    setup: RunSetup,
}

impl RunSetupBuilder {
    /// Log model statistics after the configuration.
    #[must_use]
    pub fn model_info(mut self, info: ModelInfo) -> Self {
        self.setup.model_info = Some(info);
        self
    }

    /// Log a host-supplied environment report instead of [`EnvReport::collect`].
    ///
    /// Framework, compiler and device details are only known to the host.
    #[must_use]
    pub fn env_report(mut self, report: EnvReport) -> Self {
        self.setup.env_report = Some(report);
        self
    }

    /// Record the command line the run was launched with.
    #[must_use]
    pub fn argv<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.setup.argv = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Build the `RunSetup`.
    #[must_use]
    pub fn build(self) -> RunSetup {
        self.setup
    }
}

fn ensure_dir(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(std::fs::canonicalize(path)?)
}
