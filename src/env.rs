//! Environment report logged once at fit-start

use std::fmt;

/// Separator framing the environment and model-info blocks.
#[must_use]
pub fn dash_line() -> String {
    format!("{}\n", "-".repeat(60))
}

/// Accelerator-related variables worth recording when set.
const DEVICE_VARS: &[&str] = &["CUDA_VISIBLE_DEVICES", "HIP_VISIBLE_DEVICES", "WORLD_SIZE"];

/// Ordered `key: value` description of the runtime and hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvReport {
    entries: Vec<(String, String)>,
}

impl EnvReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current process: platform, CPU count, hostname and
    /// accelerator variables. Framework versions are the host's to add.
    #[must_use]
    pub fn collect() -> Self {
        let mut report = Self::new();
        report.push("sys.platform", std::env::consts::OS);
        report.push("arch", std::env::consts::ARCH);
        report.push("family", std::env::consts::FAMILY);
        report.push(
            "cpu_count",
            std::thread::available_parallelism().map_or_else(|_| "unknown".to_string(), |n| n.to_string()),
        );
        report.push(
            "hostname",
            std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("COMPUTERNAME"))
                .unwrap_or_else(|_| "localhost".to_string()),
        );
        for var in DEVICE_VARS {
            if let Ok(value) = std::env::var(var) {
                report.push(*var, value);
            }
        }
        report
    }

    /// Append an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// The framed block written to the run log.
    #[must_use]
    pub fn framed(&self) -> String {
        let dash = dash_line();
        format!("Environment info:\n{dash}{self}\n{dash}")
    }
}

impl fmt::Display for EnvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}
