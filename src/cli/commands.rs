//! Subcommand execution for the `tzip` binary.
//!
//! Results go to stdout (the ratio line, `list` rows); diagnostics go to
//! stderr through the display-level macros.

use std::io::Write;

use anyhow::Context;

use crate::archive::list_archive;
use crate::cli::args::{Cli, Command, CompressArgs, ListArgs};
use crate::config::Config;
use crate::display::set_display_level;
use crate::displaylevel;
use crate::pipeline::{compress_directory, Outcome};

/// Outermost context attached to every fatal error before it is printed.
pub const FATAL_CONTEXT: &str = "An error has occurred";

/// Exit code for a run that wrote an archive but skipped some files.
pub const EXIT_PARTIAL: i32 = 2;

/// Executes the parsed command line and returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    set_display_level(cli.display_level());
    displaylevel!(4, "*** tzip v{} ***\n", crate::TZIP_VERSION_STRING);

    match cli.command {
        Command::Compress(args) => run_compress(&args),
        Command::List(args) => run_list(&args),
    }
}

fn run_compress(args: &CompressArgs) -> anyhow::Result<i32> {
    let config = args.to_config(Config::from_env());
    let outcome = compress_directory(&args.dir, &args.output, &config)
        .with_context(|| format!("cannot compress {}", args.dir.display()))?;

    let report = match outcome {
        Outcome::EmptyInput => {
            displaylevel!(2, "Nothing to do: no archive created \n");
            return Ok(0);
        }
        Outcome::Archived(report) => report,
    };

    println!("{}", report);
    displaylevel!(
        3,
        "{} : {} records, {} bytes \n",
        report.archive.display(),
        report.records,
        report.total_compressed
    );
    if report.is_complete() {
        Ok(0)
    } else {
        displaylevel!(
            1,
            "{} of {} files could not be compressed \n",
            report.skipped.len(),
            report.files
        );
        Ok(EXIT_PARTIAL)
    }
}

fn run_list(args: &ListArgs) -> anyhow::Result<i32> {
    let records = list_archive(&args.archive)
        .with_context(|| format!("cannot read archive {}", args.archive.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{:>8} {:>12} {:>12}", "Record", "Compressed", "Original")?;
    let (mut total_c, mut total_o) = (0u64, 0u64);
    for info in &records {
        writeln!(
            out,
            "{:>8} {:>12} {:>12}",
            info.index, info.compressed_len, info.original_len
        )?;
        total_c += info.compressed_len as u64;
        total_o += info.original_len as u64;
    }
    writeln!(out, "{:>8} {:>12} {:>12}", records.len(), total_c, total_o)?;
    Ok(0)
}
