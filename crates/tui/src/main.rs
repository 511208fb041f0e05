mod app;
mod renderer;
mod smooth;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axis_core::config::{AxisConfig, load_config, read_config};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "axis.toml";
const LOG_FILE: &str = "axis-preview.log";

/// Log to a file so the alternate screen stays clean. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AxisConfig) -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE).with_context(|| format!("creating {LOG_FILE}"))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// An explicitly named config must exist; the default one is optional.
fn config_from_args(arg: Option<String>) -> Result<AxisConfig> {
    match arg {
        Some(path) => {
            let path = PathBuf::from(path);
            read_config(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(load_config(Path::new(DEFAULT_CONFIG))),
    }
}

fn main() -> Result<()> {
    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        eprintln!("Usage: axis-preview [config.toml]");
        return Ok(());
    }

    let config = config_from_args(arg)?;
    init_tracing(&config)?;
    tracing::info!(level = %config.log_level, "starting preview");

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        renderer::restore_terminal();
        original_hook(info);
    }));

    let mut app = app::App::new(&config)?;
    renderer::run(&mut app)
}
