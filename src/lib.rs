//! roster - consistency checking for team registries.
//!
//! A project keeps a central registry document (`teams/registry.json`) and
//! one flat key-value descriptor per team (`teams/<id>.conf`). This crate
//! loads both, runs every consistency check against the snapshot, and
//! reports all violations in one pass.

pub mod app;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod team;
pub mod test_utils;

pub use error::{Result, RosterError};
