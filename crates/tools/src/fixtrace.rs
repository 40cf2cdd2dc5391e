//! Trace formatter - indents nested enter/exit/consume events

use std::io::{BufRead, Write};

/// Current nesting depth while reformatting a trace
#[derive(Debug, Default)]
pub struct TraceIndenter {
    depth: i64,
}

impl TraceIndenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> i64 {
        self.depth
    }

    fn prefix(&self) -> String {
        "| ".repeat(self.depth.max(0) as usize)
    }

    /// Reformat one line; `None` means the line produces no output
    pub fn line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() < 2 {
            return Some(line.to_string());
        }

        match words[0] {
            "exit" => {
                self.depth -= 1;
                None
            }
            "enter" => {
                self.depth += 1;
                Some(format!("{} {}", self.prefix(), words[1..].join(" ")))
            }
            "consume" => Some(format!("{} + {}", self.prefix(), words.join(" "))),
            _ => Some(line.to_string()),
        }
    }
}

/// Copy `input` to `output`, indenting trace events
pub fn fix_trace<R: BufRead, W: Write>(input: R, mut output: W) -> std::io::Result<()> {
    let mut indenter = TraceIndenter::new();
    for line in input.lines() {
        if let Some(formatted) = indenter.line(&line?) {
            writeln!(output, "{}", formatted)?;
        }
    }
    output.flush()
}
