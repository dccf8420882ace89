//! Demo host for the gallery engine: loads a YAML manifest, obtains the
//! instance through a registry, and prints the event stream.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::broadcast::error::RecvError;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use asgallery::effects::NoEffects;
use asgallery::fetch::FileFetcher;
use asgallery::fragment::MemoryFragment;
use asgallery::{InstanceRequest, Registry};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "asgallery", about = "Media gallery engine demo host")]
struct Cli {
    /// Path to the YAML gallery manifest
    #[arg(short, long, value_name = "FILE", default_value = "gallery.yaml")]
    manifest: PathBuf,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("asgallery={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let manifest = asgallery::config::from_yaml_file(&cli.manifest)
        .with_context(|| format!("loading manifest from {}", cli.manifest.display()))?;

    // asset paths in the manifest resolve relative to the manifest itself
    let base = cli
        .manifest
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let registry = Registry::new(
        Arc::new(FileFetcher::new(base)),
        Arc::new(NoEffects),
        Arc::new(MemoryFragment::default()),
    );

    let gallery = registry.get_instance(&InstanceRequest {
        id: manifest.id.clone(),
        parent_id: None,
        options: manifest.options.clone(),
        items: Some(manifest.items.clone()),
        selected: manifest.selected,
    });
    gallery.set_modal_available(true);

    let mut rx = gallery.subscribe();
    info!(
        id = %gallery.id(),
        items = gallery.len(),
        theme = %gallery.theme(),
        "gallery ready, ctrl-c to exit"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Ok(event) => info!(channel = %event.channel(gallery.id()), "event"),
                Err(RecvError::Lagged(skipped)) => {
                    info!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
