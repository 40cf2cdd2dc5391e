//! svtest - run the svparse regression tests and report results
//!
//! Exit status is 0 when the run meets its expectation, 1 when it does
//! not, and 2 when the run could not be carried out at all.

use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use svparse_harness::config::{self, Check, EnvOverride, RunnerConfig, Should};
use svparse_harness::report;
use svparse_harness::{Summary, TestRunner, WorkerPool};

#[derive(Parser, Debug)]
#[command(name = "svtest")]
#[command(author, version, about = "Run svparse tests and report results", long_about = None)]
struct Args {
    /// Command to run the parser
    runner: PathBuf,

    /// Glob-pattern for tests to run (matched against <pattern>/project.xml)
    #[arg(required = true, num_args = 1..)]
    pattern: Vec<String>,

    /// Increase output verbosity
    #[arg(short, long)]
    verbose: bool,

    /// What every test should do for the run to pass. By default both pass and warn are accepted
    #[arg(long, value_enum)]
    should: Option<Should>,

    /// Verify that the given type of expected-results file is present, otherwise warn
    #[arg(long, value_enum, num_args = 0..)]
    require: Vec<Check>,

    /// Per-test timeout in seconds
    #[arg(long, env = "SVTEST_TIMEOUT", default_value = "60")]
    timeout: u64,

    /// Number of tests to run at once (defaults to available parallelism)
    #[arg(short, long, env = "SVTEST_JOBS")]
    jobs: Option<usize>,

    /// Auxiliary config file passed to the parser
    #[arg(long, env = config::EXTRA_CONFIG_VAR, default_value = config::EXTRA_CONFIG_FILE)]
    extra_config: String,

    /// Also write results as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            runner: self.runner.clone(),
            patterns: self.pattern.clone(),
            timeout: Duration::from_secs(self.timeout),
            env: EnvOverride {
                value: self.extra_config.clone(),
                ..Default::default()
            },
            require: self.require.clone(),
            should: self.should,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    match run(args).await {
        Ok(summary) => std::process::exit(summary.exit_code()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<Summary> {
    let runner = TestRunner::new(args.runner_config());

    let mut pool = WorkerPool::new(args.jobs.unwrap_or_else(config::default_jobs));
    let summary = runner.run(&mut pool).await?;
    drop(pool);

    if let Some(path) = &args.json {
        report::write_results(&summary, path)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let args = Args::try_parse_from([
            "svtest",
            "./build/install/svparse/bin/svparse",
            "parsertests/*",
            "regressiontests/*",
            "--should",
            "warn",
            "--require",
            "tokens",
            "--verbose",
        ])
        .unwrap();

        let config = args.runner_config();
        assert_eq!(config.patterns, vec!["parsertests/*", "regressiontests/*"]);
        assert_eq!(config.should, Some(Should::Warn));
        assert_eq!(config.require, vec![Check::Tokens]);
        assert!(config.verbose);
        assert_eq!(config.env.key, "SVPARSE_EXTRA");
    }

    #[test]
    fn test_pattern_is_required() {
        assert!(Args::try_parse_from(["svtest", "svparse"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_should() {
        assert!(Args::try_parse_from(["svtest", "svparse", "t/*", "--should", "maybe"]).is_err());
    }
}
