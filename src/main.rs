//! Binary entry point for the `tzip` command-line tool.
//!
//! 1. [`Cli::parse`] processes all flags (clap prints usage and exits on
//!    bad input).
//! 2. [`run`] dispatches to the selected subcommand and returns an exit code.
//!
//! Fatal errors are reported as `An error has occurred` followed by their
//! cause chain, and exit with 1.

use clap::Parser;

use tzip::cli::args::Cli;
use tzip::cli::commands::{run, FATAL_CONTEXT};

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let e = e.context(FATAL_CONTEXT);
            tzip::displaylevel!(1, "tzip: {:#}\n", e);
            1
        }
    };
    std::process::exit(exit_code);
}
