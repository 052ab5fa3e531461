//! Test helper modules for preview-xfade integration tests
//!
//! Provides reusable test infrastructure components:
//! - FakeBackend: audio resources that record every call instead of playing
//! - CollectingReporter: keeps user-facing failure messages for assertions

#![allow(dead_code)]

pub mod fake_audio;
pub mod reporter;

// Re-export commonly used types
pub use fake_audio::{Call, FakeBackend, FakeResource};
pub use reporter::CollectingReporter;

use preview_common::EventBus;
use preview_xfade::config::FadeSettings;
use preview_xfade::PreviewController;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a controller test needs
pub struct Harness {
    pub controller: PreviewController,
    pub task: JoinHandle<()>,
    pub backend: FakeBackend,
    pub reporter: CollectingReporter,
}

/// Spawn a controller over a fake backend with default fade settings
pub fn spawn_controller() -> Harness {
    spawn_controller_with(FakeBackend::new(), FadeSettings::default())
}

pub fn spawn_controller_with(backend: FakeBackend, settings: FadeSettings) -> Harness {
    let reporter = CollectingReporter::default();
    let (controller, task) = PreviewController::spawn(
        Arc::new(backend.clone()),
        settings,
        Arc::new(reporter.clone()),
        EventBus::new(1024),
    );

    Harness {
        controller,
        task,
        backend,
        reporter,
    }
}

/// Preview URL used for an item in tests
pub fn clip_url(item: &str) -> String {
    format!("https://clips.test/{}.mp3", item)
}
