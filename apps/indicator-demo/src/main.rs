//! appind-demo: shows a status indicator with a small menu and runs the
//! native loop until Quit is chosen.
//!
//! Usage: `appind-demo [CONFIG]`. Without an argument the configuration is
//! read from the default location; a missing file means defaults.

mod app;
mod config;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use config::DemoConfig;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_path);
    let cfg = DemoConfig::load_from(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter)),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        "starting indicator demo"
    );
    app::run(&cfg)
}
