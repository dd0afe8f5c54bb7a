//! Cosmetic batch progress.
//!
//! The pipeline has no per-step progress signal from the remote model, so the
//! indicator is timer-driven: it creeps toward a ceiling while work is in
//! flight and snaps to 100 when the batch loop ends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

/// The ticker never claims completion on its own.
const TICK_CEILING: u8 = 95;
const TICK_STEP: u8 = 5;

#[derive(Clone, Default)]
pub struct BatchProgress {
    percent: Arc<AtomicU8>,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// One timer tick: advance toward the ceiling, never past it.
    pub fn advance(&self) {
        let _ = self
            .percent
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                (current < TICK_CEILING).then(|| (current + TICK_STEP).min(TICK_CEILING))
            });
    }

    /// Snap to 100 when the batch loop ends, success or not.
    pub fn complete(&self) {
        self.percent.store(100, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.percent.store(0, Ordering::Relaxed);
    }
}

/// Per-owner progress slots. Uploads and the progress read are keyed by the
/// caller, so concurrent batches from different users never share an
/// indicator.
#[derive(Clone, Default)]
pub struct ProgressRegistry {
    slots: Arc<Mutex<HashMap<Uuid, BatchProgress>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller's progress slot, created at zero on first use.
    pub fn for_owner(&self, owner_id: Uuid) -> BatchProgress {
        match self.slots.lock() {
            Ok(mut slots) => slots.entry(owner_id).or_default().clone(),
            Err(_) => BatchProgress::new(),
        }
    }
}

/// Drives `advance` on an interval until dropped.
pub struct ProgressTicker {
    handle: tokio::task::JoinHandle<()>,
}

impl ProgressTicker {
    pub fn spawn(progress: BatchProgress, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                progress.advance();
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
