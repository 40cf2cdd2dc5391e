//! Simulator shim - turns simulator-style arguments into a project XML
//!
//! Understands `+incdir+DIR`, `+define+NAME[=VALUE]`, `-y DIR`, `-f FILE`
//! (recursively, one argument per line) and bare `.sv`/`.v` sources.
//! Anything else is reported and skipped.

use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;
use tracing::debug;

use crate::error::{ShimError, ShimResult};

/// File the shim writes into the working directory
pub const OUTPUT_FILE: &str = "stylecheck.xml";

fn var_regex() -> &'static Regex {
    static VAR: OnceLock<Regex> = OnceLock::new();
    VAR.get_or_init(|| Regex::new(r"\$(\w+|\{[^}]*\})").expect("variable regex is valid"))
}

/// Generated project plus the arguments that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShimOutput {
    pub xml: String,
    pub notices: Vec<String>,
}

/// Resolves paths the way the simulator would see them
pub struct Shim<F> {
    cwd: PathBuf,
    lookup: F,
}

impl<F> Shim<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// `lookup` resolves environment variables referenced as `$NAME` or `${NAME}`
    pub fn new(cwd: impl Into<PathBuf>, lookup: F) -> Self {
        Self {
            cwd: cwd.into(),
            lookup,
        }
    }

    /// Build the project XML for a full argument list
    pub fn build<S: AsRef<str>>(&self, args: &[S]) -> ShimResult<ShimOutput> {
        let mut out = ShimOutput::default();
        out.xml.push_str("<project>\n");
        self.parse(&mut out, args.iter().map(|a| a.as_ref().to_string()))?;
        out.xml.push_str("</project>\n");
        Ok(out)
    }

    fn parse<I>(&self, out: &mut ShimOutput, args: I) -> ShimResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let arg = arg.trim();
            if arg.is_empty() {
                continue;
            }

            if let Some(dir) = arg.strip_prefix("+incdir+") {
                let _ = writeln!(out.xml, "  <incdir>{}</incdir>", self.resolve(dir).display());
            } else if let Some(define) = arg.strip_prefix("+define+") {
                let (name, value) = define.split_once('=').unwrap_or((define, ""));
                let _ = writeln!(
                    out.xml,
                    "  <define><name>{}</name><value>{}</value></define>",
                    name, value
                );
            } else if arg == "-y" {
                let dir = args.next().ok_or_else(|| ShimError::MissingValue(arg.to_string()))?;
                let _ = writeln!(out.xml, "  <moddir>{}</moddir>", self.resolve(&dir).display());
            } else if arg == "-f" {
                let list = args.next().ok_or_else(|| ShimError::MissingValue(arg.to_string()))?;
                let list = self.resolve(&list);
                debug!("Reading file list {}", list.display());

                let contents = std::fs::read_to_string(&list).map_err(|source| ShimError::FileList {
                    path: list.clone(),
                    source,
                })?;
                let _ = writeln!(out.xml, "<!-- start: {} -->", list.display());
                self.parse(out, contents.lines().map(str::to_string).collect::<Vec<_>>())?;
                let _ = writeln!(out.xml, "<!-- end: {} -->", list.display());
            } else if arg.ends_with(".sv") || arg.ends_with(".v") {
                let source = self.resolve(arg);
                if source.is_file() {
                    let _ = writeln!(out.xml, "  <source>{}</source>", source.display());
                } else {
                    out.notices
                        .push(format!("Ignoring non-file option: {}", source.display()));
                }
            } else {
                out.notices.push(format!("Ignoring unknown option: {}", arg));
            }
        }
        Ok(())
    }

    /// Expand variables and make the path absolute
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = self.expand_vars(path.trim());
        absolutize(Path::new(&expanded), &self.cwd)
    }

    /// Replace `$NAME`/`${NAME}` with their values; unknown names stay as written
    pub fn expand_vars(&self, input: &str) -> String {
        var_regex()
            .replace_all(input, |caps: &regex::Captures<'_>| {
                let whole = &caps[0];
                let name = caps[1].trim_start_matches('{').trim_end_matches('}');
                (self.lookup)(name).unwrap_or_else(|| whole.to_string())
            })
            .into_owned()
    }
}

/// Join onto `cwd` when relative and fold `.`/`..` lexically
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
