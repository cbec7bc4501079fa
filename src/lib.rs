//! Remixer - randomized video remixes from short samples
//!
//! This library crate exposes the planning and rendering pipeline for the
//! binary and for integration testing.

pub mod cli;
pub mod config;
mod error;
pub mod input;
pub mod plan;
pub mod render;
pub mod runner;

pub use error::{Error, Result};
