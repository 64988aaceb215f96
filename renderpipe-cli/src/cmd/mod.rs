pub mod build;
pub mod serve;

use clap::{Arg, Command};

/// Arguments shared by every subcommand.
pub fn add_common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing templates")
                .default_value("./site"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./renderpipe.toml"),
        )
}
