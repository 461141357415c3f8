//! Build configurations and their option layering.
//!
//! A project declares one `BuildConfig` per buildable unit. Options are
//! resolved in layers (per-config, then per-stage defaults, then built-in
//! defaults) by [`resolve`].

pub mod project;
pub mod registry;
pub mod resolve;
pub mod types;

pub use project::{Project, ProjectFile, load_project};
pub use registry::ConfigRegistry;
pub use resolve::{Layered, resolve};
pub use types::{BuildConfig, CompileOptions, ConfigError, OutputOptions, PackageOptions};
