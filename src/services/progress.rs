//! Progress publishing for map file copies.
//!
//! The copy loop reports after every 64 KiB chunk; [`ProgressThrottle`] turns
//! those reports into `receive:progress` events at most every 50ms, and always
//! emits the final byte count.

use std::time::{Duration, Instant};

use tauri::{AppHandle, Emitter, Runtime};

use crate::models::receive::ReceiveProgress;

/// Event carrying a [`ReceiveProgress`] payload.
pub const PROGRESS_EVENT: &str = "receive:progress";

/// Progress event emission interval in milliseconds.
pub const PROGRESS_EMIT_INTERVAL_MS: u64 = 50;

/// Progress line shown in the copy dialog.
pub fn progress_text(bytes_copied: u64) -> String {
    format!("{} KB copied", bytes_copied >> 10)
}

/// Rate limiter for one task's progress events.
pub struct ProgressThrottle<R: Runtime> {
    task_id: String,
    file_name: String,
    app: AppHandle<R>,
    interval: Duration,
    last_emit: Option<Instant>,
    emitted_bytes: Option<u64>,
    latest_bytes: u64,
}

impl<R: Runtime> ProgressThrottle<R> {
    pub fn new(task_id: String, file_name: String, app: AppHandle<R>) -> Self {
        Self {
            task_id,
            file_name,
            app,
            interval: Duration::from_millis(PROGRESS_EMIT_INTERVAL_MS),
            last_emit: None,
            emitted_bytes: None,
            latest_bytes: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn update(&mut self, bytes_copied: u64) {
        self.latest_bytes = bytes_copied;
        let due = self
            .last_emit
            .map_or(true, |at| at.elapsed() >= self.interval);
        if due {
            self.emit();
        }
    }

    /// Emit the latest count unless it was already emitted.
    pub fn finish(&mut self) {
        if self.emitted_bytes != Some(self.latest_bytes) {
            self.emit();
        }
    }

    fn emit(&mut self) {
        self.last_emit = Some(Instant::now());
        self.emitted_bytes = Some(self.latest_bytes);
        let _ = self.app.emit(
            PROGRESS_EVENT,
            ReceiveProgress {
                task_id: self.task_id.clone(),
                file_name: self.file_name.clone(),
                bytes_copied: self.latest_bytes,
                text: progress_text(self.latest_bytes),
            },
        );
    }
}
