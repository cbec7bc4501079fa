//! Workspace management for a render run.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace for a render run.
///
/// Provides a temporary directory for the extracted samples, the concat list
/// and the in-progress output, and moves the finished output into place.
/// The directory is created next to the destination so that finalization is
/// a rename on the same filesystem.
///
/// # Example
///
/// ```no_run
/// use remixer_av::Workspace;
///
/// let workspace = Workspace::new("/path/to/remix.mp4")?;
/// let first = workspace.sample_file(0);
/// // ... extract samples, concatenate into workspace.output() ...
/// workspace.finalize()?;
/// workspace.cleanup();
/// # Ok::<(), remixer_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    destination: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a new workspace for producing `destination`.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();

        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid output file path".to_string()))?;

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(Error::Workspace(format!(
                "Output directory does not exist: {:?}",
                parent
            )));
        }

        let temp_dir = tempfile::Builder::new()
            .prefix(".remixer-")
            .tempdir_in(&parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            destination,
            output_path,
        })
    }

    /// Final destination of the output.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Where the concatenation writes before finalization.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Artifact path for the sample at zero-based `index`.
    pub fn sample_file(&self, index: usize) -> PathBuf {
        self.temp_file(&format!("sample_{:05}.mkv", index + 1))
    }

    /// Path of the ffconcat list.
    pub fn concat_list(&self) -> PathBuf {
        self.temp_file("concat.txt")
    }

    /// Move the output to its destination.
    ///
    /// An existing destination is renamed to a `.bak` backup first and
    /// restored if the move fails. The workspace itself stays until it is
    /// dropped, kept, or cleaned up.
    pub fn finalize(&self) -> Result<PathBuf> {
        let dest = self.destination.as_path();

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        if dest.exists() {
            let backup = dest.with_extension("bak");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("Failed to create backup of existing output: {}", e))
            })?;

            if let Err(e) = std::fs::rename(&self.output_path, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }

            let _ = std::fs::remove_file(&backup);
        } else {
            std::fs::rename(&self.output_path, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        Ok(dest.to_path_buf())
    }

    /// Keep the directory on disk and return its path.
    #[allow(deprecated)]
    pub fn keep(self) -> PathBuf {
        self.temp_dir.into_path()
    }

    /// Clean up without finalizing (discard artifacts and output).
    pub fn cleanup(self) {
        // TempDir will clean up on drop
        drop(self.temp_dir);
    }
}
