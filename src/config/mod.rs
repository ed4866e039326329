// src/config/mod.rs

//! Plan file loading and validation for procrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file from disk (`loader.rs`).
//! - Validate it and turn it into an [`Executable`](crate::exec::Executable)
//!   plus runner settings (`validate.rs`).
//! - Parse human duration strings (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, parse_plan};
pub use model::{CommandSpec, ExecSection, PlanFile, RawPlanFile, RunnerSection, RunnerSettings};
