//! Command-line interface for the `tzip` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`args`]      | clap definitions (`Cli`, subcommands) and flag → [`Config`](crate::config::Config) mapping. |
//! | [`arg_utils`] | Value parsers, e.g. sizes with `K`/`M`/`G` suffixes. |
//! | [`commands`]  | Subcommand execution and exit codes. |

pub mod arg_utils;
pub mod args;
pub mod commands;
