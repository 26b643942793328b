//! Process execution for external compression tools.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors from invoking an external codec binary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The tool binary could not be found on PATH.
    #[error("tool not found: {tool} (is it installed and on PATH?)")]
    ToolNotFound { tool: String },

    /// The tool ran but exited with a non-zero status.
    #[error("{tool} failed with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    /// The tool exited successfully but the expected output file is missing.
    #[error("{tool} did not produce expected output: {path}")]
    MissingOutput { tool: String, path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Capability to invoke an external program and measure its wall time.
///
/// Injected into codec adapters so they can be exercised in tests without
/// the real binaries installed (or without the elevated privileges some
/// deployments require).
pub trait Executor: Send + Sync {
    /// Run `program` with `args` to completion, returning elapsed wall time.
    ///
    /// A non-zero exit status is an error; the caller decides what output
    /// files to expect.
    fn invoke(&self, program: &str, args: &[OsString]) -> Result<Duration, CodecError>;
}

/// Executor backed by `std::process::Command`.
///
/// Tool stdout/stderr are inherited so compression tools' own chatter lands
/// in the operator's terminal alongside our log output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn invoke(&self, program: &str, args: &[OsString]) -> Result<Duration, CodecError> {
        tracing::debug!(
            "exec: {} {}",
            program,
            args.iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let start = Instant::now();
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CodecError::ToolNotFound {
                        tool: program.to_string(),
                    }
                } else {
                    CodecError::Io(e)
                }
            })?;
        let elapsed = start.elapsed();

        if !status.success() {
            return Err(CodecError::ToolFailed {
                tool: program.to_string(),
                status,
            });
        }

        tracing::debug!("exec: {} finished in {:?}", program, elapsed);
        Ok(elapsed)
    }
}
