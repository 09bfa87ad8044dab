mod cli;
mod db;
mod error;
mod logging;
mod store;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    logging::enable_logging(cli_opts.verbose)?;
    let db_path = cli_opts.db.unwrap_or_else(db::default_db_path);
    cli::run(cli_opts.command, &db_path).inspect_err(|err| {
        debug!("command failed: {err:?}");
    })
}
