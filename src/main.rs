mod aggregator;
mod category;
mod cli;
mod clipboard;
mod file_scanner;
mod file_tree;
mod filter;
mod settings;
mod tui;
mod worker;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Handle clipboard daemon mode first; it must exit before anything
    // else touches the terminal.
    if clipboard::check_and_run_daemon_if_requested()? {
        return Ok(());
    }

    env_logger::init();

    let cli_args = cli::Cli::parse();
    workflow::run_clipsum(cli_args)
}
