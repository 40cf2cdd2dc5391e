//! simshim - stand-in for a simulator command line
//!
//! Writes `stylecheck.xml` in the working directory describing the sources,
//! include directories, library directories and defines it was given.

use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svparse_tools::simshim::{Shim, OUTPUT_FILE};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Simulator flags (-f, -y, +incdir+...) are not clap-shaped, take them raw
    let args: Vec<String> = env::args().skip(1).collect();
    let cwd = env::current_dir()?;

    let shim = Shim::new(cwd.clone(), |name: &str| env::var(name).ok());
    let output = shim.build(&args)?;

    for notice in &output.notices {
        println!("{}", notice);
    }

    let path = cwd.join(OUTPUT_FILE);
    std::fs::write(&path, output.xml)?;
    info!("Wrote {}", path.display());

    Ok(())
}
