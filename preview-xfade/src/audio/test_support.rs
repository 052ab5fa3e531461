//! In-crate fake audio backend for unit tests

use super::{AudioBackend, AudioResource, PlaybackError};
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Logs every operation of every resource it created, in order
#[derive(Default)]
pub(crate) struct LoggingBackend {
    pub log: Arc<Mutex<Vec<String>>>,
}

struct LoggingResource {
    log: Arc<Mutex<Vec<String>>>,
}

impl LoggingBackend {
    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

impl AudioBackend for LoggingBackend {
    fn create(&self) -> Box<dyn AudioResource> {
        self.log.lock().unwrap().push("create".to_string());
        Box::new(LoggingResource {
            log: Arc::clone(&self.log),
        })
    }
}

impl LoggingResource {
    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl AudioResource for LoggingResource {
    fn load(&mut self, url: &str) {
        self.push(format!("load {}", url));
    }

    fn play(&mut self) -> BoxFuture<'static, Result<(), PlaybackError>> {
        self.push("play".to_string());
        Box::pin(async { Ok(()) })
    }

    fn pause(&mut self) {
        self.push("pause".to_string());
    }

    fn set_volume(&mut self, volume: f32) {
        self.push(format!("volume {:.3}", volume));
    }

    fn set_position(&mut self, position: Duration) {
        self.push(format!("position {}", position.as_millis()));
    }

    fn release(&mut self) {
        self.push("release".to_string());
    }
}
