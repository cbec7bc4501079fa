//! External tool detection and management.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available using a custom version argument.
///
/// ffmpeg and ffprobe take `-version` rather than `--version`.
///
/// # Example
///
/// ```no_run
/// use remixer_av::check_tool_with_arg;
///
/// let info = check_tool_with_arg("ffprobe", "-version");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = which::which(name).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured {} path {:?} does not exist, searching PATH",
            name,
            path
        );
    }

    require_tool(name)
}

/// Resolved locations of the ffmpeg/ffprobe pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Resolve both tools.
    ///
    /// An explicit ffprobe path wins. Otherwise an `ffprobe` next to an
    /// overridden ffmpeg is preferred, so that `--ffmpeg /opt/ff/bin/ffmpeg`
    /// does not silently pair with a different ffprobe from `PATH`.
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Self::resolve_inner(ffmpeg, ffprobe, true)
    }

    /// Resolve for a run that only probes, such as a dry run.
    ///
    /// A missing ffmpeg is tolerated; its configured path, or the bare name,
    /// is kept but never executed.
    pub fn resolve_for_probing(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Self::resolve_inner(ffmpeg, ffprobe, false)
    }

    fn resolve_inner(
        ffmpeg: Option<&Path>,
        ffprobe: Option<&Path>,
        ffmpeg_required: bool,
    ) -> Result<Self> {
        let configured_ffmpeg = ffmpeg;
        let ffmpeg = match get_tool_path("ffmpeg", configured_ffmpeg) {
            Ok(path) => path,
            Err(Error::ToolNotFound { .. }) if !ffmpeg_required => {
                tracing::debug!("ffmpeg not found, continuing without it");
                configured_ffmpeg
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("ffmpeg"))
            }
            Err(e) => return Err(e),
        };

        let sibling = ffmpeg
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(sibling_name(&ffmpeg)))
            .filter(|p| p.exists());
        let ffprobe = match ffprobe {
            Some(path) => get_tool_path("ffprobe", Some(path))?,
            None => match sibling {
                Some(path) => path,
                None => require_tool("ffprobe")?,
            },
        };

        tracing::debug!("Using ffmpeg at {:?}, ffprobe at {:?}", ffmpeg, ffprobe);
        Ok(Self { ffmpeg, ffprobe })
    }
}

/// `ffmpeg.exe` pairs with `ffprobe.exe`, anything else with `ffprobe`.
fn sibling_name(ffmpeg: &Path) -> &'static str {
    match ffmpeg.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("exe") => "ffprobe.exe",
        _ => "ffprobe",
    }
}
