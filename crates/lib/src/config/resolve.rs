//! Layered option resolution.
//!
//! Precedence is explicit > per-stage default > global default, field by field.

use super::types::{CompileOptions, OutputOptions};

/// Options that can be stacked on top of a lower-precedence layer.
pub trait Layered: Clone {
  /// Fill every unset field of `self` from `lower`.
  fn over(self, lower: &Self) -> Self;
}

impl Layered for OutputOptions {
  fn over(self, lower: &Self) -> Self {
    Self {
      out_dir: self.out_dir.or_else(|| lower.out_dir.clone()),
      out_file: self.out_file.or_else(|| lower.out_file.clone()),
    }
  }
}

impl Layered for CompileOptions {
  fn over(self, lower: &Self) -> Self {
    Self {
      target: self.target.or_else(|| lower.target.clone()),
      module: self.module.or_else(|| lower.module.clone()),
      source_map: self.source_map.or(lower.source_map),
      out_dir: self.out_dir.or_else(|| lower.out_dir.clone()),
      out_file: self.out_file.or_else(|| lower.out_file.clone()),
    }
  }
}

/// Resolve effective options from an explicit layer, a per-stage default and a global default.
pub fn resolve<T: Layered>(explicit: Option<&T>, stage_default: Option<&T>, global_default: &T) -> T {
  let base = match stage_default {
    Some(stage) => stage.clone().over(global_default),
    None => global_default.clone(),
  };
  match explicit {
    Some(explicit) => explicit.clone().over(&base),
    None => base,
  }
}
