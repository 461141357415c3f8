
/// Environment variable overriding the root build output directory.
pub const BUILD_DIR_ENV: &str = "BUILD__DIR";

/// Build root used when neither the project file nor the environment sets one.
pub const DEFAULT_BUILD_DIR: &str = "build";

pub const DEBUG_DIR: &str = "debug";
pub const RELEASE_DIR: &str = "release";

/// File name of the compiler output when a configuration names no output file.
pub const COMPILED_PLACEHOLDER: &str = "__compiled";

pub const MINIFIED_SUFFIX: &str = ".min.js";
pub const GZIP_SUFFIX: &str = ".gz";

pub const PROJECT_FILE: &str = "stagecraft.json";
pub const PACKAGE_MANIFEST: &str = "package.json";
pub const TYPINGS_FILE: &str = "tsd.json";
pub const MARKER_FILE: &str = "stagecraft.mk";
pub const MAKEFILE: &str = "Makefile";

pub const DEFAULT_COMPILER: &str = "node_modules/.bin/tsc";
pub const DEFAULT_TYPINGS_TOOL: &str = "node_modules/.bin/tsd";

/// Name of the synthetic rule every stage run aggregates its outputs under.
pub const AGGREGATE_TARGET: &str = "run";
