//! rodio-backed audio resources
//!
//! Each resource fetches its clip on the first `play()` (HTTP(S) through
//! reqwest, anything else as a local path), keeps the encoded bytes, and plays
//! them through its own `Sink` on the shared output mixer. Volume, position
//! and play/pause intent are recorded even before the sink exists and applied
//! once it does.

use super::{AudioBackend, AudioResource, PlaybackError};
use crate::{Error, Result};
use futures::future::BoxFuture;
use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Backend creating one `Sink` per preview on the default output device
pub struct RodioBackend {
    mixer: Mixer,
    http: reqwest::Client,
}

impl RodioBackend {
    /// Open the default output device
    ///
    /// The returned `OutputStream` must be kept alive for as long as any
    /// resource created by the backend should be audible.
    pub fn open_default() -> Result<(Self, OutputStream)> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::AudioOutput(format!("Failed to open audio output: {}", e)))?;
        let mixer = stream.mixer().clone();

        Ok((
            Self {
                mixer,
                http: reqwest::Client::new(),
            },
            stream,
        ))
    }
}

impl AudioBackend for RodioBackend {
    fn create(&self) -> Box<dyn AudioResource> {
        Box::new(RodioResource {
            shared: Arc::new(Shared {
                mixer: self.mixer.clone(),
                http: self.http.clone(),
                voice: Mutex::new(Voice::default()),
                load_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }
}

struct RodioResource {
    shared: Arc<Shared>,
}

struct Shared {
    mixer: Mixer,
    http: reqwest::Client,
    voice: Mutex<Voice>,
    /// Serializes fetch + sink construction
    load_gate: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct Voice {
    url: Option<String>,
    clip: Option<Arc<[u8]>>,
    sink: Option<Sink>,
    volume: f32,
    position: Duration,
    wants_playing: bool,
    released: bool,
}

impl Voice {
    /// A resource released while loading only ever fails with `Released`
    fn failure(&self, error: PlaybackError) -> PlaybackError {
        if self.released {
            PlaybackError::Released
        } else {
            error
        }
    }
}

impl Shared {
    fn voice(&self) -> MutexGuard<'_, Voice> {
        self.voice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unless_released(&self, error: PlaybackError) -> PlaybackError {
        self.voice().failure(error)
    }

    async fn load_and_start(self: Arc<Self>) -> std::result::Result<(), PlaybackError> {
        let _gate = self.load_gate.lock().await;

        let (url, cached) = {
            let mut voice = self.voice();
            if voice.released {
                return Err(PlaybackError::Released);
            }
            // A concurrent play() may have built the sink while we waited
            if let Some(sink) = voice.sink.as_ref() {
                if voice.wants_playing {
                    sink.play();
                }
                return Ok(());
            }
            let url = voice
                .url
                .clone()
                .ok_or_else(|| PlaybackError::Load("no source bound".to_string()))?;
            (url, voice.clip.clone())
        };

        let clip = match cached {
            Some(clip) => clip,
            None => {
                let clip = fetch_clip(&self.http, &url)
                    .await
                    .map_err(|e| self.unless_released(e))?;
                self.voice().clip = Some(Arc::clone(&clip));
                clip
            }
        };

        let source = Decoder::new(Cursor::new(clip)).map_err(|e| {
            self.unless_released(PlaybackError::Decode(format!("{}: {}", url, e)))
        })?;

        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        sink.append(source);

        let mut voice = self.voice();
        if voice.released {
            sink.stop();
            return Err(PlaybackError::Released);
        }
        sink.set_volume(voice.volume);
        if !voice.position.is_zero() {
            if let Err(e) = sink.try_seek(voice.position) {
                debug!("Seek to {:?} failed for {}: {}", voice.position, url, e);
            }
        }
        // pause() issued while loading wins over this start
        if voice.wants_playing {
            sink.play();
        }
        voice.sink = Some(sink);

        debug!("Preview loaded: {}", url);
        Ok(())
    }
}

impl AudioResource for RodioResource {
    fn load(&mut self, url: &str) {
        self.shared.voice().url = Some(url.to_string());
    }

    fn play(&mut self) -> BoxFuture<'static, std::result::Result<(), PlaybackError>> {
        {
            let mut voice = self.shared.voice();
            if voice.released {
                return Box::pin(async { Err(PlaybackError::Released) });
            }
            voice.wants_playing = true;

            // The clip ran to its end; rebuild the sink from the cached bytes
            if voice.sink.as_ref().is_some_and(|sink| sink.empty()) {
                voice.sink = None;
                voice.position = Duration::ZERO;
            }

            if let Some(sink) = voice.sink.as_ref() {
                sink.play();
                return Box::pin(async { Ok(()) });
            }
        }

        let shared = Arc::clone(&self.shared);
        Box::pin(shared.load_and_start())
    }

    fn pause(&mut self) {
        let mut voice = self.shared.voice();
        voice.wants_playing = false;
        if let Some(sink) = voice.sink.as_ref() {
            sink.pause();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let mut voice = self.shared.voice();
        voice.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = voice.sink.as_ref() {
            sink.set_volume(voice.volume);
        }
    }

    fn set_position(&mut self, position: Duration) {
        let mut voice = self.shared.voice();
        voice.position = position;

        if position.is_zero() {
            // Rewinding is a rebuild from the cached clip on the next play()
            if let Some(sink) = voice.sink.take() {
                sink.stop();
            }
        } else if let Some(sink) = voice.sink.as_ref() {
            if let Err(e) = sink.try_seek(position) {
                warn!("Seek to {:?} failed: {}", position, e);
            }
        }
    }

    fn release(&mut self) {
        let mut voice = self.shared.voice();
        if voice.released {
            return;
        }
        voice.released = true;
        voice.wants_playing = false;
        voice.clip = None;
        if let Some(sink) = voice.sink.take() {
            sink.stop();
        }
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Fetch an encoded clip over HTTP(S) or from the local filesystem
async fn fetch_clip(
    http: &reqwest::Client,
    url: &str,
) -> std::result::Result<Arc<[u8]>, PlaybackError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PlaybackError::Load(format!("{}: {}", url, e)))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::Load(format!("{}: {}", url, e)))?;
        Ok(Arc::from(bytes.as_ref()))
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PlaybackError::Load(format!("{}: {}", path, e)))?;
        Ok(Arc::from(bytes))
    }
}
