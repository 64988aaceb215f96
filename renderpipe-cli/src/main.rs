mod cmd;
mod config;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("renderpipe")
        .about("Render layout-based templates over HTTP or into a static tree")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli().get_matches().subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        _ => unreachable!("clap requires a subcommand"),
    }
}
