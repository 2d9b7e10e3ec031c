mod args;
mod builtin;
mod completion;
mod config;
mod path;
mod program;
mod redirect;
mod repl;
mod terminal;

use clap::Parser as _;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = config::Config::parse();

    // diagnostics only, never mixed into redirected output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = repl::repl(&config)?;
    tracing::debug!(code, "shutting down");

    std::process::exit(code)
}
