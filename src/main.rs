//! Sticker - composites a numeric account's avatar under a fixed mask.

mod adapters;
mod canvas;
mod cassette;
mod cli;
mod compositor;
mod config;
mod context;
mod error;
mod exporter;
mod loader;
mod ports;
mod scheduler;
mod session;
#[cfg(test)]
mod testing;
mod validate;
mod watch;

use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::compositor::{CompositeOutcome, Compositor};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::StickerError;
use crate::exporter::Exporter;
use crate::loader::ImageLoader;
use crate::session::LastIdentifier;
use crate::validate::validate_identifier;
use crate::watch::Watch;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "sticker=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<(), StickerError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(StickerError::Config)?;
    debug!(path = %config_path.display(), "config loaded");

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("STICKER_REPLAY").ok();
    let is_recording = std::env::var("STICKER_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if cli.verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if cli.verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording();
        (ctx, Some(session))
    } else {
        (ServiceContext::live(), None)
    };

    let session = LastIdentifier::discover();
    let compositor =
        Arc::new(Compositor::new(ImageLoader::new(Arc::clone(&ctx.fetcher)), config.asset_sources()));
    let exporter = Exporter::new(compositor.surface(), Arc::clone(&ctx.clipboard));

    let result = match cli.command {
        Command::Render(args) => {
            let identifier = resolve_identifier(args.identifier, &session);
            render_once(&compositor, &identifier).await?;
            let dir = args.output.unwrap_or_else(|| config.export.output_dir.clone());
            watch::save(&exporter, &identifier, &dir)
        }
        Command::Copy(args) => {
            let identifier = resolve_identifier(args.identifier, &session);
            render_once(&compositor, &identifier).await?;
            exporter.copy_to_clipboard(&identifier).await?;
            eprintln!("Copied to clipboard");
            Ok(())
        }
        Command::Watch(args) => {
            let watch = Watch {
                compositor: Arc::clone(&compositor),
                exporter: &exporter,
                session: &session,
                debounce: config.debounce(),
                preview: args.preview,
                output_dir: args.output.unwrap_or_else(|| config.export.output_dir.clone()),
            };
            watch.run(BufReader::new(tokio::io::stdin())).await
        }
    };

    // Finish recording if active
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    result
}

/// Use the given identifier and remember it, or fall back to the stored one.
fn resolve_identifier(given: Option<String>, session: &LastIdentifier) -> String {
    match given {
        Some(id) => {
            let id = id.trim().to_string();
            session.remember(&id);
            id
        }
        None => session.load().unwrap_or_default(),
    }
}

/// Validate, then composite once. One-shot commands never race another
/// render, so a superseded outcome cannot happen here.
async fn render_once(compositor: &Compositor, identifier: &str) -> Result<(), StickerError> {
    validate_identifier(identifier)?;
    match compositor.composite(identifier).await? {
        CompositeOutcome::Drawn => info!(identifier, "sticker rendered"),
        CompositeOutcome::Superseded => debug!(identifier, "render superseded"),
    }
    Ok(())
}
