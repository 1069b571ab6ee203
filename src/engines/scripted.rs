//! Scripted engine
//!
//! Returns preset text for each layout mode instead of running OCR. Lets the
//! recognizer and the estimator be driven deterministically, including pass
//! failures and slow passes.

use crate::engine::{LayoutMode, LanguageSet, OcrEngine};
use crate::error::LabelError;
use image::GrayImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Script {
    outcome: Result<String, String>,
    delay: Option<Duration>,
}

/// Engine that answers each layout pass from a fixed script
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    scripts: HashMap<LayoutMode, Script>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same text for every layout mode
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        LayoutMode::DEFAULT_ORDER
            .iter()
            .fold(Self::new(), |engine, mode| engine.with_text(*mode, text.clone()))
    }

    pub fn with_text(mut self, mode: LayoutMode, text: impl Into<String>) -> Self {
        self.scripts.insert(
            mode,
            Script {
                outcome: Ok(text.into()),
                delay: None,
            },
        );
        self
    }

    pub fn with_failure(mut self, mode: LayoutMode, message: impl Into<String>) -> Self {
        self.scripts.insert(
            mode,
            Script {
                outcome: Err(message.into()),
                delay: None,
            },
        );
        self
    }

    /// Make the pass for `mode` sleep before answering
    pub fn with_delay(mut self, mode: LayoutMode, delay: Duration) -> Self {
        let script = self.scripts.entry(mode).or_insert(Script {
            outcome: Ok(String::new()),
            delay: None,
        });
        script.delay = Some(delay);
        self
    }

    /// Number of recognize calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn description(&self) -> &'static str {
        "Scripted engine - returns preset text per layout mode"
    }

    fn recognize(
        &self,
        _bitmap: &GrayImage,
        mode: LayoutMode,
        _languages: &LanguageSet,
    ) -> Result<String, LabelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(script) = self.scripts.get(&mode) else {
            return Ok(String::new());
        };

        if let Some(delay) = script.delay {
            std::thread::sleep(delay);
        }

        script.outcome.clone().map_err(LabelError::Recognition)
    }
}
