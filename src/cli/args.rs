//! Command-line definitions for the `tzip` binary.
//!
//! Two subcommands:
//! - `compress <DIR>`: archive every `*.txt` file of `DIR`
//! - `list <ARCHIVE>`: print the records of an archive
//!
//! Flags given on the command line override the `TZIP_NBWORKERS` and
//! `TZIP_QUEUE_CAPACITY` environment defaults picked up by
//! [`Config::from_env`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::arg_utils::parse_size;
use crate::config::{Config, FailurePolicy, ARCHIVE_NAME_DEFAULT, LEVEL_MAX, NB_WORKERS_MAX};
use crate::display::level_from_flags;

#[derive(Debug, Parser)]
#[command(name = "tzip", version, about = "Compress every .txt file of a directory into one archive")]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress the .txt files of a directory
    Compress(CompressArgs),
    /// List the records of an archive
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct CompressArgs {
    /// Directory to scan for .txt files (not recursive)
    pub dir: PathBuf,

    /// Archive to write
    #[arg(short, long, default_value = ARCHIVE_NAME_DEFAULT)]
    pub output: PathBuf,

    /// Number of worker threads
    #[arg(short = 'T', long = "workers",
          value_parser = clap::value_parser!(u64).range(1..=NB_WORKERS_MAX as u64))]
    pub nb_workers: Option<u64>,

    /// Capacity of the task queue
    #[arg(short = 'Q', long = "queue-capacity",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub queue_capacity: Option<u64>,

    /// Largest accepted input file (suffixes K, M, G); larger files are rejected
    #[arg(long = "max-size", value_parser = parse_size)]
    pub max_file_size: Option<usize>,

    /// zlib compression level
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=LEVEL_MAX as i64))]
    pub level: Option<u32>,

    /// Fail the whole run on the first file that cannot be compressed
    #[arg(long)]
    pub abort_on_error: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Archive to read
    pub archive: PathBuf,
}

impl Cli {
    pub fn display_level(&self) -> u32 {
        level_from_flags(self.verbose, self.quiet)
    }
}

impl CompressArgs {
    /// Applies the flags on top of `base`.
    pub fn to_config(&self, base: Config) -> Config {
        let mut config = base;
        if let Some(n) = self.nb_workers {
            config = config.with_nb_workers(n as usize);
        }
        if let Some(n) = self.queue_capacity {
            config = config.with_queue_capacity(n as usize);
        }
        if let Some(n) = self.max_file_size {
            config = config.with_max_file_size(n);
        }
        if let Some(level) = self.level {
            config = config.with_level(level);
        }
        if self.abort_on_error {
            config = config.with_failure_policy(FailurePolicy::Abort);
        }
        config
    }
}
