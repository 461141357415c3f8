//! Shared utilities.
//!
//! Shell quoting for generated command lines, plus test helpers.

pub mod shell;

#[cfg(test)]
pub mod testutil;
