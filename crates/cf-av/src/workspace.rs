//! Output staging for engine jobs.
//!
//! A [`Workspace`] owns a hidden temporary directory next to the final
//! destination. The engine writes into the workspace, and only a successful
//! job is moved onto the destination, so a failed or killed job never leaves
//! a half-written file where the caller expects the result.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Prefix of the hidden staging directories.
const STAGING_PREFIX: &str = ".clipforge-";

/// Staging area for one job's outputs.
///
/// # Example
///
/// ```no_run
/// use cf_av::Workspace;
///
/// let workspace = Workspace::new(std::path::Path::new("/renders/final.mp4")).unwrap();
/// // ... run the engine, writing to workspace.output() ...
/// let final_path = workspace.finalize().unwrap();
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    destination: PathBuf,
}

impl Workspace {
    /// Create a workspace for a job whose result belongs at `destination`.
    ///
    /// The staging directory is created in the destination's parent so the
    /// final move is a same-filesystem rename.
    pub fn new(destination: &Path) -> cf_core::Result<Self> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| {
                cf_core::Error::tool(
                    "workspace",
                    format!("failed to create staging dir in {}: {e}", parent.display()),
                )
            })?;

        Ok(Self {
            temp_dir,
            destination: destination.to_path_buf(),
        })
    }

    /// Where the result ends up after [`Workspace::finalize`].
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The staged output path: same file name as the destination, inside
    /// the staging directory. Keeping the name keeps the extension, which
    /// the engine uses to pick a muxer.
    pub fn output(&self) -> PathBuf {
        let file_name = self
            .destination
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("output"));
        self.temp_dir.path().join(file_name)
    }

    /// Path to the staging directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a path for a named file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Move a staged file to `dest`, replacing anything already there.
    ///
    /// Tries a rename first and falls back to copy + remove when the two
    /// paths sit on different filesystems.
    pub fn persist(&self, staged: &Path, dest: &Path) -> cf_core::Result<PathBuf> {
        if !staged.exists() {
            return Err(cf_core::Error::tool(
                "workspace",
                format!("output file does not exist: {}", staged.display()),
            ));
        }

        if let Err(_rename_err) = std::fs::rename(staged, dest) {
            std::fs::copy(staged, dest).map_err(|e| {
                cf_core::Error::tool(
                    "workspace",
                    format!("failed to copy output to {}: {e}", dest.display()),
                )
            })?;
            let _ = std::fs::remove_file(staged);
        }

        tracing::debug!(dest = %dest.display(), "output persisted");
        Ok(dest.to_path_buf())
    }

    /// Move the staged output onto the destination and drop the staging
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine produced no output file or the move
    /// fails.
    pub fn finalize(self) -> cf_core::Result<PathBuf> {
        let output = self.output();
        self.persist(&output, &self.destination)
    }
}
