//! Shared task status for front ends
//!
//! A UI or CLI polls [`SharedStatus`] while operations run on worker threads.
//! Numeric fields are atomics; strings and payload bytes sit behind mutexes.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// State of a single or batch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum TaskStatus {
    #[default]
    Ready = 0,
    Executing = 1,
    Successful = 2,
    Exited = 3,
    Paused = 4,
    Resumed = 5,
}

impl TaskStatus {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TaskStatus::Ready),
            1 => Some(TaskStatus::Executing),
            2 => Some(TaskStatus::Successful),
            3 => Some(TaskStatus::Exited),
            4 => Some(TaskStatus::Paused),
            5 => Some(TaskStatus::Resumed),
            _ => None,
        }
    }

    /// Whether a task in this state is still running.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            TaskStatus::Executing | TaskStatus::Paused | TaskStatus::Resumed
        )
    }
}

#[derive(Debug, Default)]
struct StatusText {
    response: String,
    timing: String,
    task: String,
    response_data: Vec<u8>,
    started: Option<Instant>,
}

/// Status fields shared between workers and the front end.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    percent: Arc<AtomicU32>,
    single: Arc<AtomicI32>,
    multiple: Arc<AtomicI32>,
    text: Arc<Mutex<StatusText>>,
}

impl SharedStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_text<R>(&self, f: impl FnOnce(&mut StatusText) -> R) -> R {
        let mut text = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut text)
    }

    // ==================== Progress ====================

    /// Update progress from a worker. `current` is 0-based.
    pub fn update_progress(&self, current: usize, total: usize) {
        let pct = if total > 0 {
            (((current + 1).min(total) as f64 / total as f64) * 100.0) as u32
        } else {
            0
        };
        self.percent.store(pct, Ordering::SeqCst);
    }

    /// Progress as integer percentage (0-100).
    #[must_use]
    pub fn percent(&self) -> u32 {
        self.percent.load(Ordering::SeqCst)
    }

    // ==================== Single task ====================

    /// Mark the start of a single task.
    pub fn begin_single(&self, description: &str) {
        self.percent.store(0, Ordering::SeqCst);
        self.single.store(TaskStatus::Executing.code(), Ordering::SeqCst);
        self.with_text(|text| {
            text.task = description.to_string();
            text.response.clear();
            text.timing.clear();
            text.started = Some(Instant::now());
        });
    }

    /// Mark the current single task as finished.
    pub fn finish_single(&self, response: &str) {
        self.percent.store(100, Ordering::SeqCst);
        self.single.store(TaskStatus::Successful.code(), Ordering::SeqCst);
        self.with_text(|text| {
            text.response = response.to_string();
            text.timing = elapsed_message(text.started.take());
        });
    }

    /// Mark the current single task as failed, recording the error.
    pub fn fail_single(&self, error: &dyn std::error::Error) {
        self.exit_single(&format!("Error: {error}"));
    }

    /// Mark the current single task as stopped without a result.
    pub fn exit_single(&self, response: &str) {
        self.single.store(TaskStatus::Exited.code(), Ordering::SeqCst);
        self.with_text(|text| {
            text.response = response.to_string();
            text.timing = elapsed_message(text.started.take());
        });
    }

    #[must_use]
    pub fn single_status(&self) -> TaskStatus {
        TaskStatus::from_code(self.single.load(Ordering::SeqCst)).unwrap_or_default()
    }

    // ==================== Batch tasks ====================

    pub fn set_multiple_status(&self, status: TaskStatus) {
        self.multiple.store(status.code(), Ordering::SeqCst);
    }

    #[must_use]
    pub fn multiple_status(&self) -> TaskStatus {
        TaskStatus::from_code(self.multiple.load(Ordering::SeqCst)).unwrap_or_default()
    }

    // ==================== Text and payload ====================

    /// Description of the task in progress.
    #[must_use]
    pub fn task_string(&self) -> String {
        self.with_text(|text| text.task.clone())
    }

    /// Result or error text of the last task.
    #[must_use]
    pub fn response_string(&self) -> String {
        self.with_text(|text| text.response.clone())
    }

    /// How long the last task took.
    #[must_use]
    pub fn timing_string(&self) -> String {
        self.with_text(|text| text.timing.clone())
    }

    pub fn set_response_data(&self, data: Vec<u8>) {
        self.with_text(|text| text.response_data = data);
    }

    /// Take the payload of the last task, leaving it empty.
    #[must_use]
    pub fn take_response_data(&self) -> Vec<u8> {
        self.with_text(|text| std::mem::take(&mut text.response_data))
    }

    /// Reset everything to `Ready`.
    pub fn reset(&self) {
        self.percent.store(0, Ordering::SeqCst);
        self.single.store(TaskStatus::Ready.code(), Ordering::SeqCst);
        self.multiple.store(TaskStatus::Ready.code(), Ordering::SeqCst);
        self.with_text(|text| *text = StatusText::default());
    }
}

fn elapsed_message(started: Option<Instant>) -> String {
    started.map_or_else(String::new, |start| format_elapsed(start.elapsed()))
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("Completed in {:.3}s", elapsed.as_secs_f64())
}
