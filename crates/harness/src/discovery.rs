//! Test discovery - expanding glob patterns into test directories

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DESCRIPTOR_FILE;
use crate::error::{HarnessError, HarnessResult};

/// A single test case: a directory holding a descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    dir: PathBuf,
}

impl TestCase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory that identifies this test
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Descriptor handed to the runner
    pub fn descriptor(&self) -> PathBuf {
        self.dir.join(DESCRIPTOR_FILE)
    }

    /// Path of a file that lives next to the descriptor
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl std::fmt::Display for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir.display())
    }
}

/// Tests matched by one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: String,
    pub glob: String,
    pub count: usize,
}

/// Outcome of expanding every pattern
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub tests: Vec<TestCase>,
    pub patterns: Vec<PatternMatch>,
}

impl Discovery {
    pub fn total(&self) -> usize {
        self.tests.len()
    }
}

/// Glob actually expanded for a user pattern
pub fn descriptor_glob(pattern: &str) -> String {
    Path::new(pattern)
        .join(DESCRIPTOR_FILE)
        .to_string_lossy()
        .into_owned()
}

fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    }
}

/// Expand each pattern to the directories containing a descriptor.
///
/// Results keep pattern order and are not deduplicated across patterns.
/// Wildcards do not match a leading `.`, so hidden directories are only
/// picked up when named explicitly. Entries that cannot be read while
/// walking are skipped.
pub fn discover<S: AsRef<str>>(patterns: &[S]) -> HarnessResult<Discovery> {
    let mut discovery = Discovery::default();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob_pattern = descriptor_glob(pattern);

        let paths = glob::glob_with(&glob_pattern, match_options()).map_err(|source| HarnessError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut count = 0;
        for entry in paths {
            match entry {
                Ok(descriptor) => {
                    let dir = descriptor
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    debug!("Discovered test: {}", dir.display());
                    discovery.tests.push(TestCase::new(dir));
                    count += 1;
                }
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", e.path().display(), e.error());
                }
            }
        }

        discovery.patterns.push(PatternMatch {
            pattern: pattern.to_string(),
            glob: glob_pattern,
            count,
        });
    }

    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_test(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DESCRIPTOR_FILE), "<project/>").unwrap();
    }

    #[test]
    fn test_discover_only_dirs_with_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        make_test(tmp.path(), "alpha");
        make_test(tmp.path(), "beta");
        fs::create_dir_all(tmp.path().join("no-descriptor")).unwrap();

        let pattern = format!("{}/*", tmp.path().display());
        let discovery = discover(&[pattern]).unwrap();

        assert_eq!(discovery.total(), 2);
        assert_eq!(discovery.tests[0].dir(), tmp.path().join("alpha"));
        assert_eq!(discovery.tests[1].dir(), tmp.path().join("beta"));
        assert_eq!(discovery.patterns[0].count, 2);
    }

    #[test]
    fn test_discover_skips_hidden_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        make_test(tmp.path(), "visible");
        make_test(tmp.path(), ".hidden");

        let pattern = format!("{}/*", tmp.path().display());
        let discovery = discover(&[pattern]).unwrap();
        assert_eq!(discovery.total(), 1);
        assert_eq!(discovery.tests[0].dir(), tmp.path().join("visible"));

        let explicit = format!("{}/.hidden", tmp.path().display());
        let discovery = discover(&[explicit]).unwrap();
        assert_eq!(discovery.total(), 1);
        assert_eq!(discovery.tests[0].dir(), tmp.path().join(".hidden"));
    }

    #[test]
    fn test_discover_keeps_duplicates_across_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        make_test(tmp.path(), "alpha");
        make_test(tmp.path(), "beta");

        let all = format!("{}/*", tmp.path().display());
        let one = format!("{}/beta", tmp.path().display());
        let discovery = discover(&[one, all]).unwrap();

        let dirs: Vec<_> = discovery.tests.iter().map(|t| t.dir().to_path_buf()).collect();
        assert_eq!(
            dirs,
            vec![
                tmp.path().join("beta"),
                tmp.path().join("alpha"),
                tmp.path().join("beta"),
            ]
        );
        assert_eq!(discovery.patterns[0].count, 1);
        assert_eq!(discovery.patterns[1].count, 2);
    }

    #[test]
    fn test_discover_no_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let pattern = format!("{}/missing/*", tmp.path().display());
        let discovery = discover(&[pattern]).unwrap();
        assert_eq!(discovery.total(), 0);
        assert_eq!(discovery.patterns[0].count, 0);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = discover(&["tests/[unclosed"]).unwrap_err();
        assert!(matches!(err, HarnessError::Pattern { .. }));
    }

    #[test]
    fn test_descriptor_paths() {
        let test = TestCase::new("parsertests/simple");
        assert_eq!(test.descriptor(), PathBuf::from("parsertests/simple/project.xml"));
        assert_eq!(test.file("tokens"), PathBuf::from("parsertests/simple/tokens"));
        assert_eq!(descriptor_glob("parsertests/*"), "parsertests/*/project.xml");
    }
}
