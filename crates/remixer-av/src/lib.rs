//! # remixer-av
//!
//! External media tool plumbing for remixer.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolPaths`]) -- locate ffmpeg and ffprobe, honouring
//!   explicit overrides.
//! - **Command execution** ([`ToolCommand`]) -- synchronous builder that
//!   captures output and keeps a stderr tail for error reports.
//! - **Probing** ([`probe`]) -- duration and stream metadata via ffprobe JSON.
//! - **Actions** ([`actions`]) -- argument builders for sample extraction and
//!   concat-demuxer concatenation.
//! - **The tool seam** ([`MediaTool`], [`Ffmpeg`]) -- the trait the renderer
//!   talks to, and its ffmpeg implementation.
//! - **Workspace management** ([`Workspace`]) -- temporary directory lifecycle
//!   with safe finalization.
//!
//! ## Example
//!
//! ```no_run
//! use remixer_av::{Ffmpeg, MediaTool, ToolPaths};
//! use std::path::Path;
//!
//! let tool = Ffmpeg::new(ToolPaths::resolve(None, None)?);
//! let info = tool.probe(Path::new("/path/to/video.mp4"))?;
//! println!("{:?}s, audio: {}", info.duration, info.has_audio);
//! # Ok::<(), remixer_av::Error>(())
//! ```

pub mod actions;
mod backend;
pub mod command;
mod error;
pub mod probe;
pub mod tools;
pub mod workspace;

// Re-exports
pub use backend::{Ffmpeg, MediaTool};
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use probe::{MediaInfo, VideoStream};
pub use tools::{check_tool_with_arg, get_tool_path, require_tool, ToolInfo, ToolPaths};
pub use workspace::Workspace;
