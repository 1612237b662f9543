//! `tsc-stdin`: type-check an unsaved buffer.
//!
//! Reads the content of `<file>` from stdin, type-checks it against the nearest
//! `tsconfig.json` as if it were saved at `<file>`, and prints one
//! `path[line, column]: message` line per diagnostic of that file.
//!
//! # Usage
//!
//! ```bash
//! cat src/app.ts | tsc-stdin src/app.ts
//! ```
//!
//! # Environment
//!
//! - `TSC_STDIN_TSSERVER`: path of `tsserver.js` (default: nearest `node_modules/typescript`)
//! - `TSC_STDIN_NODE`: Node.js binary (default: `node`)
//! - `TSC_STDIN_LOG`: log filter for stderr (default: `warn`)

mod logging;

use anyhow::Context;
use clap::Parser;
use std::env;
use std::io;
use tracing::debug;
use tsc_stdin_core::{check_reader, write_report};
use tsc_stdin_tsserver::{EngineSettings, TsServerEngine};

#[derive(Debug, Parser)]
#[command(
    name = "tsc-stdin",
    version,
    about = "Type-check a TypeScript buffer read from stdin as if it were saved at <FILE>"
)]
struct Cli {
    /// Path the buffer stands in for; only its diagnostics are printed
    #[arg(value_name = "FILE")]
    file: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let base_dir = env::current_dir().context("failed to determine the current directory")?;
    let settings = EngineSettings::from_env();
    debug!(?settings, base_dir = %base_dir.display(), "engine settings");

    let mut engine = TsServerEngine::new(settings, &base_dir);
    let reports = check_reader(&mut engine, &cli.file, io::stdin().lock(), &base_dir)
        .with_context(|| format!("failed to check {}", cli.file))?;

    write_report(io::stdout().lock(), &reports).context("failed to write diagnostics")?;
    Ok(())
}
