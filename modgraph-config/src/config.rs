use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use modgraph_types::Name;

const ENV_LIBRARY_PATH: &str = "MODGRAPH_LIBRARY_PATH";
const ENV_TRACE_LEVEL: &str = "MODGRAPH_TRACE_LEVEL";
const ENV_SUPPRESS_PLATFORM_DEFAULT: &str = "MODGRAPH_SUPPRESS_PLATFORM_DEFAULT";

/// The explicit handle carrying every environment-influenced knob of the
/// module system, in place of the process-wide global state a naive port
/// would reach for.
#[derive(Clone, Debug)]
pub struct ModuleSystemConfig {
    library_path: PathBuf,
    trace_level: u8,
    suppress_platform_default: bool,
    platform_module: Name,
}

impl ModuleSystemConfig {
    /// Builds a config from this process's environment, falling back to
    /// platform defaults for anything unset.
    pub fn from_env() -> Self {
        let library_path = env::var(ENV_LIBRARY_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_library_path());
        let trace_level = env::var(ENV_TRACE_LEVEL)
            .ok()
            .and_then(|value| value.parse::<u8>().ok())
            .map(|value| value.min(9))
            .unwrap_or(0);
        let suppress_platform_default = env::var(ENV_SUPPRESS_PLATFORM_DEFAULT)
            .map(|value| parse_bool(&value))
            .unwrap_or(false);
        Self {
            library_path,
            trace_level,
            suppress_platform_default,
            platform_module: default_platform_module(),
        }
    }

    /// Builds a config with explicit values, bypassing the environment.
    pub fn new(
        library_path: PathBuf,
        trace_level: u8,
        suppress_platform_default: bool,
        platform_module: Name,
    ) -> Self {
        Self {
            library_path,
            trace_level: trace_level.min(9),
            suppress_platform_default,
            platform_module,
        }
    }

    /// Returns the library directory to resolve against.
    pub fn library_path(&self) -> &std::path::Path {
        &self.library_path
    }

    /// Sets the library directory, overriding any value from the environment.
    pub fn with_library_path(mut self, library_path: PathBuf) -> Self {
        self.library_path = library_path;
        self
    }

    /// Returns the informational trace level, `0..=9`.
    pub fn trace_level(&self) -> u8 {
        self.trace_level
    }

    /// Sets the trace level, clamped to `0..=9`.
    pub fn with_trace_level(mut self, trace_level: u8) -> Self {
        self.trace_level = trace_level.min(9);
        self
    }

    /// Returns whether the synthetic platform dependence should be suppressed.
    pub fn suppress_platform_default(&self) -> bool {
        self.suppress_platform_default
    }

    /// Sets whether the synthetic platform dependence should be suppressed.
    pub fn with_suppress_platform_default(mut self, suppress: bool) -> Self {
        self.suppress_platform_default = suppress;
        self
    }

    /// Returns the name every resolved module implicitly depends on, unless suppressed.
    pub fn platform_module(&self) -> &Name {
        &self.platform_module
    }

    /// Sets the platform-default module name.
    pub fn with_platform_module(mut self, platform_module: Name) -> Self {
        self.platform_module = platform_module;
        self
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn default_library_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(env::var("PROGRAMDATA").unwrap_or_else(|_| "C:\\ProgramData".to_string()))
            .join("modgraph")
    } else {
        PathBuf::from("/var/lib/modgraph")
    }
}

fn default_platform_module() -> Name {
    Name::from_str("modgraph.platform.base").expect("constant platform module name is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_truthy_bool_values() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("YES"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn trace_level_is_clamped() {
        let config = ModuleSystemConfig::new(
            PathBuf::from("/tmp/lib"),
            42,
            false,
            default_platform_module(),
        );
        assert_eq!(config.trace_level(), 9);
    }

    #[test]
    fn builder_methods_override_fields() {
        let config = ModuleSystemConfig::from_env()
            .with_library_path(PathBuf::from("/custom/path"))
            .with_trace_level(3)
            .with_suppress_platform_default(true);
        assert_eq!(config.library_path(), std::path::Path::new("/custom/path"));
        assert_eq!(config.trace_level(), 3);
        assert!(config.suppress_platform_default());
    }
}
