//! svparse regression test harness
//!
//! Runs the svparse executable over a tree of test directories and
//! classifies each run:
//! - Expands glob patterns into directories holding a `project.xml`
//! - Spawns the parser once per test on a bounded worker pool
//! - Scans the captured output for ambiguity reports and diffs the
//!   `DEBUG_TOKEN:` stream against an optional `tokens` golden file
//! - Writes `output.log` per test and prints a colored summary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TestRunner                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  discover(patterns) -> Discovery                            │
//! │  WorkerPool (semaphore-bounded JoinSet)                     │
//! │    └── run_and_check(test)                                  │
//! │          ├── Executor::execute -> ExecutionResult           │
//! │          ├── Classifier::classify -> Findings               │
//! │          └── write output.log -> Verdict                    │
//! │  Summary (pass / warn / fail, should-constraint)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod pool;
pub mod report;
pub mod runner;

pub use classify::{Classifier, Findings, Status, Verdict};
pub use config::{Check, RunnerConfig, Should};
pub use discovery::{discover, Discovery, TestCase};
pub use error::{HarnessError, HarnessResult};
pub use executor::{ExecutionResult, Executor, ExitOutcome};
pub use pool::WorkerPool;
pub use runner::{Summary, TestRunner};
