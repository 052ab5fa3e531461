//! Recording audio backend
//!
//! Every resource the backend creates registers itself under the URL it is
//! loaded with. Tests look resources up by URL and inspect the calls the
//! controller made on them.

use futures::future::BoxFuture;
use preview_xfade::audio::{AudioBackend, AudioResource, PlaybackError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One operation on a fake resource
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    SetVolume(f32),
    SetPosition(Duration),
    Release,
}

/// How `play()` behaves for one URL
#[derive(Debug, Clone, Default)]
struct PlayBehavior {
    delay: Duration,
    failure: Option<PlaybackError>,
}

#[derive(Default)]
struct BackendState {
    resources: HashMap<String, Vec<FakeResource>>,
    behaviors: HashMap<String, PlayBehavior>,
    created: usize,
}

/// Shared, cloneable fake backend
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `play()` on resources for `url` fail with `error`
    pub fn fail_play(&self, url: &str, error: PlaybackError) {
        let mut state = self.state.lock().unwrap();
        state.behaviors.entry(url.to_string()).or_default().failure = Some(error);
    }

    /// Let `play()` for `url` succeed again
    pub fn allow_play(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.behaviors.entry(url.to_string()).or_default().failure = None;
    }

    /// Resolve `play()` for `url` only after `delay`
    pub fn delay_play(&self, url: &str, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.behaviors.entry(url.to_string()).or_default().delay = delay;
    }

    /// Most recent resource loaded with `url`
    pub fn resource(&self, url: &str) -> FakeResource {
        self.resources(url)
            .pop()
            .unwrap_or_else(|| panic!("no resource loaded for {}", url))
    }

    /// Every resource ever loaded with `url`, oldest first
    pub fn resources(&self, url: &str) -> Vec<FakeResource> {
        let state = self.state.lock().unwrap();
        state.resources.get(url).cloned().unwrap_or_default()
    }

    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    fn behavior(&self, url: &str) -> PlayBehavior {
        let state = self.state.lock().unwrap();
        state.behaviors.get(url).cloned().unwrap_or_default()
    }

    fn register(&self, url: &str, resource: FakeResource) {
        let mut state = self.state.lock().unwrap();
        state
            .resources
            .entry(url.to_string())
            .or_default()
            .push(resource);
    }
}

impl AudioBackend for FakeBackend {
    fn create(&self) -> Box<dyn AudioResource> {
        self.state.lock().unwrap().created += 1;
        Box::new(BoundResource {
            backend: self.clone(),
            record: FakeResource::default(),
            url: None,
        })
    }
}

#[derive(Debug, Default)]
struct ResourceState {
    calls: Vec<Call>,
    volume: f32,
    playing: bool,
    released: bool,
}

/// Inspection view of one fake resource
#[derive(Debug, Clone, Default)]
pub struct FakeResource {
    state: Arc<Mutex<ResourceState>>,
}

impl FakeResource {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Every volume written, in order
    pub fn volumes(&self) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetVolume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().unwrap().released
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        let mut state = self.state.lock().unwrap();
        match &call {
            Call::Play => state.playing = true,
            Call::Pause => state.playing = false,
            Call::SetVolume(v) => state.volume = *v,
            Call::Release => {
                state.playing = false;
                state.released = true;
            }
            Call::Load(_) | Call::SetPosition(_) => {}
        }
        state.calls.push(call);
    }
}

/// The resource handed to the controller
struct BoundResource {
    backend: FakeBackend,
    record: FakeResource,
    url: Option<String>,
}

impl AudioResource for BoundResource {
    fn load(&mut self, url: &str) {
        self.record.record(Call::Load(url.to_string()));
        self.backend.register(url, self.record.clone());
        self.url = Some(url.to_string());
    }

    fn play(&mut self) -> BoxFuture<'static, Result<(), PlaybackError>> {
        self.record.record(Call::Play);
        let behavior = match &self.url {
            Some(url) => self.backend.behavior(url),
            None => PlayBehavior {
                delay: Duration::ZERO,
                failure: Some(PlaybackError::Load("no source".to_string())),
            },
        };

        Box::pin(async move {
            if !behavior.delay.is_zero() {
                tokio::time::sleep(behavior.delay).await;
            }
            match behavior.failure {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    fn pause(&mut self) {
        self.record.record(Call::Pause);
    }

    fn set_volume(&mut self, volume: f32) {
        self.record.record(Call::SetVolume(volume));
    }

    fn set_position(&mut self, position: Duration) {
        self.record.record(Call::SetPosition(position));
    }

    fn release(&mut self) {
        self.record.record(Call::Release);
    }
}
