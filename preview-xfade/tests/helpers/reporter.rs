//! Failure reporter that remembers what it was told

use preview_xfade::report::FailureReporter;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct CollectingReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl FailureReporter for CollectingReporter {
    fn report_failure(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
