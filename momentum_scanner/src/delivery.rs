//! Handing the finished report to whatever publishes it.
//!
//! Delivery runs once per successful run, after the report file and the cache are
//! written. Its failure is reported to the caller as a warning, never as a failed run.

use std::{path::Path, process::Command};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Placeholder in delivery arguments replaced by the report path.
pub const REPORT_PLACEHOLDER: &str = "{report}";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

pub trait ReportDelivery {
    fn deliver(&self, report: &Path) -> Result<(), DeliveryError>;
}

/// Runs an external program, e.g. `scp -q {report} host:/path/index.html`.
///
/// Blocks until the program exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDelivery {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandDelivery {
    fn resolved_args(&self, report: &Path) -> Vec<String> {
        let report = report.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace(REPORT_PLACEHOLDER, &report))
            .collect()
    }
}

impl ReportDelivery for CommandDelivery {
    fn deliver(&self, report: &Path) -> Result<(), DeliveryError> {
        let args = self.resolved_args(report);
        debug!(program = %self.program, ?args, "delivering report");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| DeliveryError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(DeliveryError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
