/// Per-evaluation work area: a private ephemeral directory plus a unique
/// artifact-naming token, so concurrent evaluations sharing a filesystem
/// never collide.
use crate::config::types::{Result, SandboxError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Exclusively-owned working directory for one evaluation.
///
/// `enter()` changes the process working directory, so a `WorkArea` is
/// meant for the single-purpose worker process, not the orchestrator. The
/// previous directory is restored before the area is deleted, so the
/// process never keeps running from a path that is about to disappear.
pub struct WorkArea {
    token: String,
    dir: PathBuf,
    prev_dir: PathBuf,
}

/// Task ids come from benchmark corpora and may contain path separators
/// (e.g. `HumanEval/0`); keep only filename-safe bytes.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

impl WorkArea {
    /// Create the private directory and change into it.
    pub fn enter(task_id: Option<&str>) -> Result<Self> {
        let stem = sanitize_component(task_id.unwrap_or("task"));
        let suffix = Uuid::new_v4().simple().to_string();
        let token = format!("{}_{}", stem, &suffix[..8]);

        let dir = env::temp_dir().join(format!("testbox-{token}"));
        fs::create_dir_all(&dir).map_err(|e| {
            SandboxError::Workspace(format!("failed to create {}: {e}", dir.display()))
        })?;

        let prev_dir = env::current_dir()
            .map_err(|e| SandboxError::Workspace(format!("failed to read cwd: {e}")))?;
        if let Err(e) = env::set_current_dir(&dir) {
            let _ = fs::remove_dir_all(&dir);
            return Err(SandboxError::Workspace(format!(
                "failed to enter {}: {e}",
                dir.display()
            )));
        }

        Ok(Self {
            token,
            dir,
            prev_dir,
        })
    }

    /// Unique artifact-naming token: `<task-or-default>_<8-hex>`.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for the evaluation's single source file.
    pub fn source_path(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", self.token))
    }

    /// Path for the evaluation's single built executable.
    pub fn binary_path(&self) -> PathBuf {
        self.dir.join(&self.token)
    }

    /// Write the sample source under the token-derived name.
    pub fn write_source(&self, extension: &str, contents: &str) -> Result<PathBuf> {
        let path = self.source_path(extension);
        fs::write(&path, contents).map_err(|e| {
            SandboxError::Workspace(format!("failed to write {}: {e}", path.display()))
        })?;
        Ok(path)
    }

    /// Restore the previous working directory, then remove the area.
    /// Idempotent; failures are logged, never raised.
    fn cleanup(&self) {
        if let Err(e) = env::set_current_dir(&self.prev_dir) {
            log::warn!(
                "failed to restore working directory {}: {e}",
                self.prev_dir.display()
            );
        }
        if self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                log::warn!("failed to remove work area {}: {e}", self.dir.display());
            }
        }
    }
}

impl Drop for WorkArea {
    fn drop(&mut self) {
        self.cleanup();
    }
}
