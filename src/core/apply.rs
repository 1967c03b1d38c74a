//! Subprocess collaborator that feeds extracted patches to `git apply`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use thiserror::Error;

/// Direction a patch is applied to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Stage: apply the patch to the index (`git apply --cached`).
    Stage,
    /// Unstage: apply the patch in reverse (`git apply --cached --reverse`).
    Unstage,
}

/// Errors from the apply collaborator.
///
/// On failure the caller leaves the document and region index untouched so
/// the user can retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// `git apply` rejected the patch; the message is git's stderr.
    #[error("git apply failed: {0}")]
    GitError(String),
    /// I/O error spawning or talking to the subprocess.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs `git apply` in a working directory, piping the patch over stdin.
#[derive(Debug, Clone)]
pub struct GitApplier {
    workdir: PathBuf,
}

impl GitApplier {
    /// Create an applier rooted at the given repository working directory.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// The working directory git runs in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Apply a single-hunk patch to the index, staging or unstaging it.
    pub fn apply(&self, patch: &str, mode: ApplyMode) -> Result<(), ApplyError> {
        let mut command = Command::new("git");
        command.arg("apply").arg("--cached");
        if mode == ApplyMode::Unstage {
            command.arg("--reverse");
        }
        command
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!("running git apply ({mode:?}) in {}", self.workdir.display());
        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(patch.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ApplyError::GitError(stderr));
        }
        Ok(())
    }
}
