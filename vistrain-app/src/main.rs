mod app;
mod distance;
mod keys;
mod transcriber;

use anyhow::{Context, Result};
use app::App;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vistrain_experiment::EngineConfig;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    App::new(config)?.run()
}
