use std::io;

use anyhow::Result;
use clap::Parser;
use dealer_data::{Cli, init_logging, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let mut stdout = io::stdout().lock();
    run(cli, &mut stdout).await
}
