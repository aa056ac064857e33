//! Form renderer double.

use std::sync::{Arc, Mutex};

use jsonform_controller::{FormRenderer, RenderError, RenderRequest};

/// [`FormRenderer`] that records every render call.
///
/// Clones share their records, so a test can keep one handle while the controller owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    renders: Arc<Mutex<Vec<(String, RenderRequest)>>>,
    failure: Option<String>,
}

impl RecordingRenderer {
    /// Creates a renderer that accepts every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer that rejects every document with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of render calls so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders.lock().expect("lock").len()
    }

    /// Element and request of the last render call.
    #[must_use]
    pub fn last(&self) -> Option<(String, RenderRequest)> {
        self.renders.lock().expect("lock").last().cloned()
    }
}

impl FormRenderer for RecordingRenderer {
    fn render(&mut self, element: &str, request: RenderRequest) -> Result<(), RenderError> {
        self.renders
            .lock()
            .expect("lock")
            .push((element.to_string(), request));
        match &self.failure {
            Some(message) => Err(RenderError(message.clone())),
            None => Ok(()),
        }
    }
}
