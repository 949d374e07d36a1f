//! hackeros-builder library.
//!
//! Component map, leaf to root:
//! - [`compat`] - which tracks this host may build
//! - [`descriptor`] - `build.json` loading and validation
//! - [`profile`] - `*.profile` to live-build package lists
//! - [`orchestrator`] - clean, configure, build, finalize, clean
//! - [`artifact`] - rename/move/checksum of the finished image
//!
//! The CLI handlers in [`commands`] wire these together.

pub mod artifact;
pub mod commands;
pub mod common;
pub mod compat;
pub mod config;
pub mod descriptor;
pub mod orchestrator;
pub mod preflight;
pub mod process;
pub mod profile;
pub mod timing;
pub mod track;
