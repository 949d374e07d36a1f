//! Shared utilities.

pub mod files;

pub use files::mirror_dir;
