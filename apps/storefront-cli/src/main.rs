//! # storefront: Command-Line Storefront Client
//!
//! ```text
//! storefront products --query lamp
//! storefront login ann@example.com secret
//! storefront order --item 3:2 --name Ann --address "1 Main St" --phone 555
//! storefront orders
//! storefront admin login root secret
//! ```
//!
//! Configuration comes from `storefront.toml` in the platform config
//! directory, `--config`, or `STOREFRONT_API_URL` / `STOREFRONT_STORAGE_PATH`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    commands::run_command(cli).await
}

/// Logs go to stderr so command output stays clean.
///
/// ## Log Levels
/// - Default: warnings, plus info from the client crate
/// - `--verbose`: debug from the client crate
/// - `RUST_LOG` overrides both
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,storefront_client=debug,storefront_cli=debug"
    } else {
        "warn,storefront_client=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
