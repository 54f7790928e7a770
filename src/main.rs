use clap::Parser;
use miette::Result;
use mpq_minify::cli::{self, Cli};

fn main() -> Result<()> {
    let args = Cli::parse();
    cli::run(args)?;
    Ok(())
}
