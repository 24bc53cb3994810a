//! # rawtx
//!
//! Entry point for the `rawtx` binary.
//!
//! - `build`    build and sign a payment with change, optionally relay it
//! - `checksum` print the envelope checksum of a hex payload

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::{Commands, RawTxCli};

fn main() -> Result<()> {
    let cli = RawTxCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Build(args) => commands::build(args),
        Commands::Checksum(args) => commands::checksum_cmd(args),
    }
}
