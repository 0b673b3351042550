mod cli;
mod config;
mod form;
mod model;
mod notify;
mod orchestrator;
mod relay;
mod submission;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = !args.is_tui();

    SimpleLogger::new()
        .with_level(args.effective_log_level())
        .init()?;

    match cli::run(args).await {
        Ok(true) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        // A submission that was not delivered is reported through its notification.
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}
