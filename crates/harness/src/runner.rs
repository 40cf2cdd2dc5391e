//! Main test runner that discovers, executes, classifies and tallies tests

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{Classifier, Status, Verdict};
use crate::config::{RunnerConfig, Should, LOG_FILE};
use crate::discovery::{discover, TestCase};
use crate::error::HarnessResult;
use crate::executor::Executor;
use crate::pool::WorkerPool;
use crate::report;

/// Result of running all tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub should: Option<Should>,
    pub verdicts: Vec<Verdict>,
}

impl Summary {
    pub fn new(total: usize, should: Option<Should>) -> Self {
        Self {
            total,
            should,
            ..Default::default()
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        match verdict.status {
            Status::Pass => self.passed += 1,
            Status::Warn => self.warned += 1,
            Status::Fail => self.failed += 1,
        }
        self.verdicts.push(verdict);
    }

    /// Overall outcome: no failures, or every test matching `should`
    pub fn success(&self) -> bool {
        match self.should {
            None => self.failed == 0,
            Some(Should::Pass) => self.passed == self.total,
            Some(Should::Warn) => self.warned == self.total,
            Some(Should::Fail) => self.failed == self.total,
        }
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Drives discovery, parallel execution and reporting for one run
pub struct TestRunner {
    config: RunnerConfig,
    executor: Executor,
    classifier: Classifier,
}

impl TestRunner {
    pub fn new(config: RunnerConfig) -> Self {
        let executor = Executor::new(&config.runner, config.env.clone(), config.timeout);
        let classifier = Classifier::new(config.require.clone(), config.verbose);
        Self {
            config,
            executor,
            classifier,
        }
    }

    /// Run every discovered test on `pool` and print results as they arrive.
    ///
    /// Per-test problems end up in the verdicts. An error here means the run
    /// itself could not proceed (bad pattern, runner could not be spawned).
    pub async fn run(&self, pool: &mut WorkerPool<HarnessResult<Verdict>>) -> HarnessResult<Summary> {
        let discovery = discover(self.config.patterns.as_slice())?;
        report::print_discovery(&discovery, self.config.verbose);

        info!(
            "Running {} test(s) with {} worker(s)...",
            discovery.total(),
            pool.size()
        );

        let mut summary = Summary::new(discovery.total(), self.config.should);
        for test in discovery.tests {
            pool.submit(run_and_check(
                self.executor.clone(),
                self.classifier.clone(),
                test,
            ));
        }

        while let Some(joined) = pool.next().await {
            let verdict = joined??;
            report::print_verdict(&verdict, self.config.should);
            summary.record(verdict);
        }

        report::print_summary(&summary);
        Ok(summary)
    }
}

/// Execute one test, persist its output and classify it
pub async fn run_and_check(
    executor: Executor,
    classifier: Classifier,
    test: TestCase,
) -> HarnessResult<Verdict> {
    let execution = executor.execute(&test).await?;
    debug!(
        "{} finished in {} ms ({:?})",
        test,
        execution.elapsed.as_millis(),
        execution.outcome
    );

    let log_file = test.file(LOG_FILE);
    let mut findings = classifier.classify(&test, &execution).await;
    if let Err(e) = tokio::fs::write(&log_file, &execution.output).await {
        findings.error(format!("Failed to write {}: {}", log_file.display(), e));
    }

    Ok(Verdict::new(&test, log_file, &execution, findings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Findings;
    use crate::executor::ExitOutcome;
    use std::path::PathBuf;
    use test_case::test_case;

    fn verdict(status: Status) -> Verdict {
        let mut findings = Findings::default();
        match status {
            Status::Pass => {}
            Status::Warn => findings.warning("reportAmbiguity"),
            Status::Fail => findings.error("returncode=1"),
        }
        Verdict {
            test: PathBuf::from("t"),
            status: findings.status(),
            log_file: PathBuf::from("t/output.log"),
            outcome: ExitOutcome::Exited(0),
            elapsed_ms: 0,
            findings,
        }
    }

    fn summary(statuses: &[Status], should: Option<Should>) -> Summary {
        let mut summary = Summary::new(statuses.len(), should);
        for status in statuses {
            summary.record(verdict(*status));
        }
        summary
    }

    #[test_case(&[Status::Pass, Status::Warn], None, true; "warn accepted by default")]
    #[test_case(&[Status::Pass, Status::Fail], None, false; "fail rejected by default")]
    #[test_case(&[Status::Pass, Status::Pass], Some(Should::Pass), true; "all pass")]
    #[test_case(&[Status::Pass, Status::Warn], Some(Should::Pass), false; "warn breaks should pass")]
    #[test_case(&[Status::Warn, Status::Warn], Some(Should::Warn), true; "all warn")]
    #[test_case(&[Status::Warn, Status::Pass], Some(Should::Warn), false; "pass breaks should warn")]
    #[test_case(&[Status::Fail, Status::Fail], Some(Should::Fail), true; "all fail")]
    #[test_case(&[Status::Fail, Status::Pass], Some(Should::Fail), false; "pass breaks should fail")]
    #[test_case(&[], Some(Should::Fail), true; "empty run")]
    fn test_summary_success(statuses: &[Status], should: Option<Should>, expected: bool) {
        let summary = summary(statuses, should);
        assert_eq!(summary.success(), expected);
        assert_eq!(summary.exit_code(), if expected { 0 } else { 1 });
    }

    #[test]
    fn test_summary_counts() {
        let summary = summary(&[Status::Pass, Status::Warn, Status::Fail, Status::Fail], None);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.warned, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.verdicts.len(), 4);
    }
}
