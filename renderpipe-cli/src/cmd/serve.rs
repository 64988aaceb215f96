use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use renderpipe_core::Pipeline;

use crate::config::RenderpipeConfig;

pub fn make_subcommand() -> Command {
    super::add_common_args(Command::new("serve"))
        .about("Render pages on request")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .default_value("3000"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = RenderpipeConfig::load(args)?;
    let build_config = config.build_config();

    let addr = resolve_addr(&build_config.host, build_config.port).await?;

    let pipeline = Pipeline::new(&build_config.source);
    let addr = pipeline.listen_on(addr).await?;

    println!("Serving {} at http://{}", build_config.source, addr);

    if build_config.open {
        if let Err(e) = open::that(format!("http://{}", addr)) {
            tracing::warn!("Failed to open browser: {e}");
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    Ok(())
}

/// First address `host` resolves to. Accepts IP literals and names like `localhost`.
async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("{host} did not resolve to any address"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literal_resolves_as_is() {
        let addr = resolve_addr("127.0.0.1", 8080).await.unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_hostname_is_resolved() {
        let addr = resolve_addr("localhost", 3000).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);
    }
}
