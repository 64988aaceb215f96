use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use renderpipe_core::Pipeline;

use crate::config::RenderpipeConfig;

pub fn make_subcommand() -> Command {
    super::add_common_args(Command::new("build"))
        .about("Render every page under the source directory to static files")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for rendered pages")
                .default_value("./out"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = RenderpipeConfig::load(args)?;
    let build_config = config.build_config();

    let pipeline = Pipeline::new(&build_config.source);
    let summary = pipeline
        .render_static(&build_config.output)
        .with_context(|| format!("failed to export {}", build_config.source))?;

    println!(
        "Rendered {} page(s) into {} ({} partial(s) skipped)",
        summary.written.len(),
        build_config.output,
        summary.skipped.len()
    );

    Ok(())
}
