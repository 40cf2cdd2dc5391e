//! Output classification - turning captured runner output into a verdict
//!
//! Two checks run over every execution: the ambiguity-marker scan and,
//! when a `tokens` file sits next to the descriptor, a position-by-position
//! comparison of the `DEBUG_TOKEN:` stream against it. Exit status problems
//! are recorded alongside; whichever messages accumulate decide the status.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Check;
use crate::discovery::TestCase;
use crate::executor::{ExecutionResult, ExitOutcome};

/// Emitted by the parser generator when it hits a grammar ambiguity
pub const AMBIGUITY_MARKER: &str = "reportAmbiguity";

/// Token values starting with this prefix are end-of-file markers
pub const EOF_PREFIX: &str = "EOF(";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"DEBUG_TOKEN:\s+(.*)").expect("token regex is valid"))
}

/// Final classification of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Messages collected while checking one test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub errors: BTreeSet<String>,
    pub warnings: BTreeSet<String>,
    pub info: BTreeSet<String>,
}

impl Findings {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.insert(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.insert(message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.info.insert(message.into());
    }

    /// Errors make a failure; warnings alone make a warning
    pub fn status(&self) -> Status {
        if !self.errors.is_empty() {
            Status::Fail
        } else if !self.warnings.is_empty() {
            Status::Warn
        } else {
            Status::Pass
        }
    }
}

/// Verdict for one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub test: PathBuf,
    pub status: Status,
    pub log_file: PathBuf,
    pub outcome: ExitOutcome,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub findings: Findings,
}

impl Verdict {
    pub fn new(
        test: &TestCase,
        log_file: PathBuf,
        execution: &ExecutionResult,
        findings: Findings,
    ) -> Self {
        Self {
            test: test.dir().to_path_buf(),
            status: findings.status(),
            log_file,
            outcome: execution.outcome,
            elapsed_ms: execution.elapsed.as_millis() as u64,
            findings,
        }
    }
}

/// Options steering classification
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    pub require: Vec<Check>,
    pub verbose: bool,
}

impl Classifier {
    pub fn new(require: Vec<Check>, verbose: bool) -> Self {
        Self { require, verbose }
    }

    /// Run every check over one execution of `test`
    pub async fn classify(&self, test: &TestCase, execution: &ExecutionResult) -> Findings {
        let mut findings = Findings::default();

        check_exit(&mut findings, execution.outcome);
        detect_ambiguity(&mut findings, &execution.output);

        for check in Check::ALL {
            let path = test.file(check.file_name());
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                if self.require.contains(&check) {
                    findings.warning(format!("Checking-file not found: {}", path.display()));
                }
                continue;
            }
            match check {
                Check::Tokens => {
                    self.check_tokens_file(&mut findings, &execution.output, &path)
                        .await;
                }
            }
        }

        findings
    }

    async fn check_tokens_file(&self, findings: &mut Findings, output: &str, path: &Path) {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let expected = parse_expected_tokens(&contents);
                compare_tokens(findings, &observed_tokens(output), &expected, self.verbose);
            }
            Err(e) => findings.error(format!("Failed to read {}: {}", path.display(), e)),
        }
    }
}

/// Record timeout, non-zero exit, signal death or a lost process
pub fn check_exit(findings: &mut Findings, outcome: ExitOutcome) {
    match outcome {
        ExitOutcome::Exited(0) => {}
        ExitOutcome::Exited(code) => findings.error(format!("returncode={}", code)),
        ExitOutcome::Signaled => findings.error("terminated by signal"),
        ExitOutcome::TimedOut => findings.error("timeout"),
        ExitOutcome::WaitFailed => findings.error("wait failed"),
    }
}

pub fn detect_ambiguity(findings: &mut Findings, output: &str) {
    if output.contains(AMBIGUITY_MARKER) {
        findings.warning(AMBIGUITY_MARKER);
    }
}

/// Tokens reported by the runner, end-of-file markers removed
pub fn observed_tokens(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| token_regex().captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|tok| !tok.starts_with(EOF_PREFIX))
        .map(str::to_string)
        .collect()
}

/// One token per non-blank line, trimmed
pub fn parse_expected_tokens(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compare observed against expected, stopping at the first difference
pub fn compare_tokens(findings: &mut Findings, observed: &[String], expected: &[String], verbose: bool) {
    if observed.len() != expected.len() {
        findings.error(format!(
            "Not the same number of tokens ({} observed vs {} expected)",
            observed.len(),
            expected.len()
        ));
        return;
    }

    if let Some((actual, wanted)) = observed.iter().zip(expected).find(|(a, e)| a != e) {
        findings.error(format!("Token mismatch, expected <{}> but got <{}>", wanted, actual));
        return;
    }

    if verbose {
        findings.info(format!("Tokens were as expected ({} tokens)", observed.len()));
    }
}
