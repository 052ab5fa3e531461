//! Hover preview driver (preview-xfade) - Main entry point
//!
//! Loads an artist list and feeds hover events to the crossfade controller.
//! Events come as lines on stdin, the way a list UI would emit them:
//!
//! ```text
//! enter <id>      hover-enter on an artist card
//! leave <id>      hover-leave on an artist card
//! reload [file]   load a new artist list (defaults to the current file)
//! status          print every handle
//! quit            dispose and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use preview_common::{EventBus, ItemId, PreviewEvent};
use preview_xfade::audio::RodioBackend;
use preview_xfade::catalog::ArtistList;
use preview_xfade::config::{ConfigOrigin, TomlConfig, CONFIG_ENV_VAR};
use preview_xfade::report::LogReporter;
use preview_xfade::PreviewController;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for preview-xfade
#[derive(Parser, Debug)]
#[command(name = "preview-xfade")]
#[command(about = "Hover-driven audio preview crossfader")]
#[command(version)]
struct Args {
    /// Artist list (JSON array with id, name, topTrackPreview)
    #[arg(short, long)]
    artists: PathBuf,

    /// Configuration file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

/// One line of driver input
#[derive(Debug, PartialEq)]
enum LineCommand {
    Enter(ItemId),
    Leave(ItemId),
    Reload(Option<PathBuf>),
    Status,
    Quit,
}

impl LineCommand {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let arg = words.next();

        match (verb, arg) {
            ("enter", Some(id)) => Some(LineCommand::Enter(ItemId::new(id))),
            ("leave", Some(id)) => Some(LineCommand::Leave(ItemId::new(id))),
            ("reload", path) => Some(LineCommand::Reload(path.map(PathBuf::from))),
            ("status", None) => Some(LineCommand::Status),
            ("quit" | "exit", None) => Some(LineCommand::Quit),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let (config, origin) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &origin {
        ConfigOrigin::File(path) => info!("Configuration: {}", path.display()),
        ConfigOrigin::Missing(path) => {
            warn!("Config file {} not found, using defaults", path.display())
        }
        ConfigOrigin::Defaults => info!("No config file, using defaults"),
    }

    // Keep the output stream alive for the whole session
    let (backend, _stream) = RodioBackend::open_default().context("Failed to open audio output")?;
    info!("Audio output opened");

    let events = EventBus::new(config.event_capacity);
    tokio::spawn(log_events(events.subscribe()));

    let (controller, controller_task) = PreviewController::spawn(
        Arc::new(backend),
        config.fade.settings(),
        Arc::new(LogReporter),
        events,
    );

    let mut artists_path = args.artists;
    let mut artists = ArtistList::load(&artists_path)
        .await
        .with_context(|| format!("Failed to load artist list {}", artists_path.display()))?;
    info!("Loaded {} artists from {}", artists.len(), artists_path.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = &mut shutdown => break,
        };
        let Some(line) = line else {
            info!("stdin closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match LineCommand::parse(&line) {
            Some(LineCommand::Enter(id)) => match artists.preview_url(&id) {
                Some(url) => controller.on_item_hover_enter(id, url)?,
                None => debug!("{} has no preview", id),
            },
            Some(LineCommand::Leave(id)) => controller.on_item_hover_leave(id)?,
            Some(LineCommand::Reload(path)) => {
                if let Some(path) = path {
                    artists_path = path;
                }
                match ArtistList::load(&artists_path).await {
                    Ok(list) => {
                        let released = controller.on_list_replaced().await?;
                        info!(
                            "Loaded {} artists from {} ({} previews released)",
                            list.len(),
                            artists_path.display(),
                            released
                        );
                        artists = list;
                    }
                    Err(e) => warn!(
                        "Could not load artists from {}: {}",
                        artists_path.display(),
                        e
                    ),
                }
            }
            Some(LineCommand::Status) => {
                for snapshot in controller.snapshot_all().await? {
                    println!(
                        "{:<24} {:<10} {:.2} {:?}",
                        snapshot.item_id.as_str(),
                        snapshot.state.to_string(),
                        snapshot.volume,
                        snapshot.ramp
                    );
                }
            }
            Some(LineCommand::Quit) => break,
            None => warn!("Unrecognized command: {}", line.trim()),
        }
    }

    let released = controller.dispose().await?;
    controller.shutdown()?;
    controller_task
        .await
        .context("Preview controller task failed")?;

    info!("Shutdown complete ({} previews released)", released);
    Ok(())
}

/// Log controller events until the bus closes
async fn log_events(mut rx: broadcast::Receiver<PreviewEvent>) {
    loop {
        match rx.recv().await {
            Ok(PreviewEvent::StateChanged {
                item_id,
                old_state,
                new_state,
                volume,
                ..
            }) => debug!("{}: {} -> {} ({:.2})", item_id, old_state, new_state, volume),
            Ok(PreviewEvent::PlaybackFailed { item_id, message, .. }) => {
                warn!("Preview {} failed: {}", item_id, message)
            }
            Ok(PreviewEvent::HandlesReleased { count, .. }) => {
                debug!("{} preview handles released", count)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event log lagged, {} events skipped", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hover_commands() {
        assert_eq!(
            LineCommand::parse("enter a1"),
            Some(LineCommand::Enter(ItemId::new("a1")))
        );
        assert_eq!(
            LineCommand::parse("  leave   a1 "),
            Some(LineCommand::Leave(ItemId::new("a1")))
        );
        assert_eq!(LineCommand::parse("enter"), None);
    }

    #[test]
    fn test_parse_control_commands() {
        assert_eq!(LineCommand::parse("reload"), Some(LineCommand::Reload(None)));
        assert_eq!(
            LineCommand::parse("reload next.json"),
            Some(LineCommand::Reload(Some(PathBuf::from("next.json"))))
        );
        assert_eq!(LineCommand::parse("status"), Some(LineCommand::Status));
        assert_eq!(LineCommand::parse("exit"), Some(LineCommand::Quit));
        assert_eq!(LineCommand::parse("dance"), None);
    }
}
