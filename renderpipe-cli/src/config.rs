use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderpipeConfig {
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Source directory containing templates
    pub source: String,
    /// Output directory for static export
    pub output: String,
    /// Configuration file path
    pub config: String,
    /// Host for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./site".to_string(),
            output: "./out".to_string(),
            config: "./renderpipe.toml".to_string(),
            host: "127.0.0.1".to_string(),
            port: renderpipe_core::DEFAULT_PORT,
            open: false,
        }
    }
}

impl RenderpipeConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (RENDERPIPE_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .ok()
            .flatten()
            .cloned()
            .unwrap_or_else(|| BuildConfig::default().config);

        let mut builder = ConfigBuilder::builder();

        builder = builder.add_source(ConfigBuilder::try_from(&Self::default())?);

        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        builder = builder.add_source(
            Environment::with_prefix("RENDERPIPE")
                .prefix_separator("_")
                .separator("__"),
        );

        // Only flags the user actually passed; clap defaults would otherwise
        // shadow the file and the environment.
        for key in ["source", "output", "config", "host", "port"] {
            if let Some(value) = explicit::<String>(args, key) {
                builder = builder.set_override(format!("build.{key}"), value.clone())?;
            }
        }
        if explicit::<bool>(args, "open").copied().unwrap_or(false) {
            builder = builder.set_override("build.open", true)?;
        }

        let config: RenderpipeConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

fn explicit<'a, T>(args: &'a ArgMatches, id: &str) -> Option<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    if !args.ids().any(|known| known == id) {
        return None;
    }
    match args.value_source(id) {
        Some(clap::parser::ValueSource::CommandLine) => args.try_get_one::<T>(id).ok().flatten(),
        _ => None,
    }
}
