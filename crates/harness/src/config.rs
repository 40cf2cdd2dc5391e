//! Harness configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Descriptor file every test directory must contain
pub const DESCRIPTOR_FILE: &str = "project.xml";

/// Log file written into every test directory
pub const LOG_FILE: &str = "output.log";

/// Environment variable pointing the parser at its auxiliary config
pub const EXTRA_CONFIG_VAR: &str = "SVPARSE_EXTRA";

/// Auxiliary config the parser loads while under test
pub const EXTRA_CONFIG_FILE: &str = "svparse_extra_test.xml";

/// Expected outcome shared by every test in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Should {
    Pass,
    Warn,
    Fail,
}

impl Should {
    pub fn as_str(&self) -> &'static str {
        match self {
            Should::Pass => "pass",
            Should::Warn => "warn",
            Should::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Should {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expectation files a test directory may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    /// Expected `DEBUG_TOKEN:` stream, one token per line
    Tokens,
}

impl Check {
    pub const ALL: [Check; 1] = [Check::Tokens];

    /// File name of the expectation inside a test directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Check::Tokens => "tokens",
        }
    }
}

/// Environment override handed to every runner invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub key: String,
    pub value: String,
}

impl Default for EnvOverride {
    fn default() -> Self {
        Self {
            key: EXTRA_CONFIG_VAR.to_string(),
            value: EXTRA_CONFIG_FILE.to_string(),
        }
    }
}

/// Configuration for one harness run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Parser executable to invoke
    pub runner: PathBuf,

    /// Glob patterns for test directories
    pub patterns: Vec<String>,

    /// Per-test timeout
    pub timeout: Duration,

    /// Environment override passed to the runner
    pub env: EnvOverride,

    /// Expectation files whose absence is a warning
    pub require: Vec<Check>,

    /// Expected outcome for every test
    pub should: Option<Should>,

    /// Emit informational messages and extra discovery output
    pub verbose: bool,
}

impl RunnerConfig {
    pub fn new(runner: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            runner: runner.into(),
            patterns,
            ..Default::default()
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runner: PathBuf::from("./build/install/svparse/bin/svparse"),
            patterns: vec!["parsertests/*".to_string()],
            timeout: Duration::from_secs(60),
            env: EnvOverride::default(),
            require: Vec::new(),
            should: None,
            verbose: false,
        }
    }
}

/// Default worker count: the available parallelism, or one
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
