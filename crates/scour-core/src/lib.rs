//! Core library for `scour`, which removes build caches and artifacts from a
//! project tree while keeping local developer configuration.
//!
//! Provides the pattern model, rule configuration, project-root discovery,
//! removal planning, size accounting, and removal.

pub mod clean;
pub mod config;
pub mod detect;
pub mod error;
pub mod pattern;
pub mod size;
