//! Media processing actions.
//!
//! Each action is a plain description of one external tool invocation plus a
//! pure function building its argument list:
//! - Extracting a sample from a source file
//! - Concatenating the extracted samples

mod concat;
mod extract;

pub use concat::{concat_args, concat_list, write_concat_list, AudioMode, ConcatJob};
pub use extract::{extract_args, EncodeSettings, ExtractJob, SampleAudio, VideoMode};
