//! stagecraft-lib: build-task configuration for compile, minify and publish pipelines.
//!
//! This crate provides:
//! - `config`: build configurations, option layering, and the project file loader
//! - `graph`: the task graph of directory, file and aggregate rules
//! - `stage`: compile/minify/publish stages that declare rules into the graph
//! - `execute`: make-style execution of the graph with bounded parallelism
//! - `orchestrate`: the top-level `compile`, `minify` and `publish` entry points

pub mod config;
pub mod consts;
pub mod execute;
pub mod graph;
pub mod orchestrate;
pub mod paths;
pub mod settings;
pub mod stage;
pub mod util;
