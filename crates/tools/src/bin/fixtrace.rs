//! fixtrace - indent a parser trace read from stdin

use std::io::{self, BufWriter};

fn main() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    svparse_tools::fixtrace::fix_trace(stdin.lock(), BufWriter::new(stdout.lock()))?;
    Ok(())
}
