pub mod completions;
pub mod convert;

use clap::Parser;
use clap_complete::Shell;

use crate::error::Result;

/// Unpacks Diablo and/or Hellfire MPQs, converts all the graphics to CLX
///
/// If no MPQs are passed on the command line, converts all the MPQs in the
/// current directory.
#[derive(Parser, Debug)]
#[command(name = "unpack-and-minify-mpq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub convert: convert::ConvertArgs,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Run the command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.completions {
        Some(shell) => completions::run(shell),
        None => convert::run(cli.convert),
    }
}
