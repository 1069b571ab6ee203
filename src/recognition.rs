//! Multi-pass text recognition
//!
//! Runs the OCR engine once per layout assumption against the same bitmap and
//! keeps one result according to a [`SelectionPolicy`]. A pass that errors or
//! misses the deadline counts as empty text; recognition itself never fails.

use crate::config::Config;
use crate::engine::{LanguageSet, LayoutMode, OcrEngine};
use crate::preprocessing::NormalizedBitmap;
use image::GrayImage;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How a single layout pass ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PassStatus {
    Completed,
    Failed(String),
    TimedOut,
    /// Not started: every worker thread was busy
    Overloaded,
}

/// Text produced by one layout pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionAttempt {
    pub mode: LayoutMode,
    pub text: String,
    pub status: PassStatus,
}

impl RecognitionAttempt {
    fn completed(mode: LayoutMode, text: String) -> Self {
        Self {
            mode,
            text,
            status: PassStatus::Completed,
        }
    }

    fn empty(mode: LayoutMode, status: PassStatus) -> Self {
        Self {
            mode,
            text: String::new(),
            status,
        }
    }

    /// Character count after trimming surrounding whitespace
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Picks the attempt whose text is used downstream
pub trait SelectionPolicy: Send + Sync {
    /// `attempts` arrive in configured mode order, whatever order passes finished in
    fn select<'a>(&self, attempts: &'a [RecognitionAttempt]) -> Option<&'a RecognitionAttempt>;
}

/// Longest non-empty trimmed text wins; ties keep the earliest attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestText;

impl SelectionPolicy for LongestText {
    fn select<'a>(&self, attempts: &'a [RecognitionAttempt]) -> Option<&'a RecognitionAttempt> {
        // max_by_key keeps the last of equal maxima, so walk backwards
        attempts
            .iter()
            .filter(|a| a.trimmed_len() > 0)
            .rev()
            .max_by_key(|a| a.trimmed_len())
    }
}

/// Engine-facing settings injected at construction
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Layout passes, in tie-breaking order
    pub modes: Vec<LayoutMode>,
    pub languages: LanguageSet,
    /// Deadline shared by all passes of one call
    pub timeout: Option<Duration>,
    /// Run passes on separate threads instead of one after another
    pub parallel: bool,
    /// Worker threads allowed at once, including passes abandoned at the deadline
    pub max_workers: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            modes: LayoutMode::DEFAULT_ORDER.to_vec(),
            languages: LanguageSet::default(),
            timeout: None,
            parallel: false,
            max_workers: 16,
        }
    }
}

impl From<&Config> for RecognizerConfig {
    fn from(config: &Config) -> Self {
        Self {
            modes: LayoutMode::DEFAULT_ORDER.to_vec(),
            languages: config.languages.clone(),
            timeout: config.ocr_timeout,
            parallel: config.parallel_passes,
            max_workers: config.max_ocr_threads,
        }
    }
}

/// Outcome of a recognition call: every attempt plus the chosen text
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    pub attempts: Vec<RecognitionAttempt>,
    pub selected: Option<LayoutMode>,
    pub text: String,
}

pub struct Recognizer {
    engine: Arc<dyn OcrEngine>,
    config: RecognizerConfig,
    policy: Arc<dyn SelectionPolicy>,
    workers: Arc<AtomicUsize>,
}

impl Recognizer {
    pub fn new(engine: Arc<dyn OcrEngine>, config: RecognizerConfig) -> Self {
        Self {
            engine,
            config,
            policy: Arc::new(LongestText),
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Worker threads still running, including passes abandoned at the deadline
    pub fn workers_in_flight(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    /// Recognized text, or an empty string when every pass came back empty
    pub fn recognize(&self, bitmap: &NormalizedBitmap) -> String {
        self.run(bitmap).text
    }

    /// Run all layout passes and apply the selection policy
    pub fn run(&self, bitmap: &NormalizedBitmap) -> Recognition {
        let attempts = if self.config.timeout.is_none() && !self.config.parallel {
            self.run_inline(bitmap.as_image())
        } else {
            self.run_on_workers(bitmap.as_image())
        };

        let chosen = self.policy.select(&attempts);
        let selected = chosen.map(|a| a.mode);
        let text = chosen.map(|a| a.text.clone()).unwrap_or_default();

        tracing::debug!(
            selected = selected.map(|m| m.as_str()).unwrap_or("none"),
            text_len = text.len(),
            "recognition finished"
        );

        Recognition {
            attempts,
            selected,
            text,
        }
    }

    fn run_inline(&self, image: &GrayImage) -> Vec<RecognitionAttempt> {
        self.config
            .modes
            .iter()
            .map(|&mode| run_pass(self.engine.as_ref(), image, mode, &self.config.languages))
            .collect()
    }

    fn run_on_workers(&self, image: &GrayImage) -> Vec<RecognitionAttempt> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let image = Arc::new(image.clone());
        let (tx, rx) = mpsc::channel::<(usize, RecognitionAttempt)>();

        let jobs: Vec<Vec<(usize, LayoutMode)>> = if self.config.parallel {
            self.config
                .modes
                .iter()
                .copied()
                .enumerate()
                .map(|job| vec![job])
                .collect()
        } else {
            vec![self.config.modes.iter().copied().enumerate().collect()]
        };

        let mut slots: Vec<Option<RecognitionAttempt>> = vec![None; self.config.modes.len()];
        let mut pending = slots.len();

        for job in jobs {
            let Some(slot) = WorkerSlot::acquire(&self.workers, self.config.max_workers) else {
                tracing::warn!(
                    running = self.workers_in_flight(),
                    max = self.config.max_workers,
                    "no recognition worker available"
                );
                for (index, mode) in job {
                    slots[index] = Some(RecognitionAttempt::empty(mode, PassStatus::Overloaded));
                    pending -= 1;
                }
                continue;
            };

            let engine = Arc::clone(&self.engine);
            let image = Arc::clone(&image);
            let languages = self.config.languages.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let _slot = slot;
                for (index, mode) in job {
                    let attempt = run_pass(engine.as_ref(), &image, mode, &languages);
                    // Receiver is gone once the deadline has passed
                    if tx.send((index, attempt)).is_err() {
                        return;
                    }
                }
            });
        }
        drop(tx);

        while pending > 0 {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    rx.recv_timeout(remaining).ok()
                }
                None => rx.recv().ok(),
            };
            let Some((index, attempt)) = received else {
                break;
            };
            slots[index] = Some(attempt);
            pending -= 1;
        }

        slots
            .into_iter()
            .zip(self.config.modes.iter())
            .map(|(slot, &mode)| {
                slot.unwrap_or_else(|| {
                    tracing::warn!(
                        mode = mode.as_str(),
                        running = self.workers_in_flight(),
                        "recognition pass timed out"
                    );
                    RecognitionAttempt::empty(mode, PassStatus::TimedOut)
                })
            })
            .collect()
    }
}

/// Claim on one of the recognizer's worker threads, released on drop
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn acquire(workers: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| Self(Arc::clone(workers)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn run_pass(
    engine: &dyn OcrEngine,
    image: &GrayImage,
    mode: LayoutMode,
    languages: &LanguageSet,
) -> RecognitionAttempt {
    let start = Instant::now();
    match engine.recognize(image, mode, languages) {
        Ok(text) => {
            tracing::debug!(
                mode = mode.as_str(),
                chars = text.trim().chars().count(),
                time_ms = start.elapsed().as_millis() as u64,
                "recognition pass finished"
            );
            RecognitionAttempt::completed(mode, text)
        }
        Err(e) => {
            tracing::warn!(mode = mode.as_str(), error = %e, "recognition pass failed");
            RecognitionAttempt::empty(mode, PassStatus::Failed(e.to_string()))
        }
    }
}
