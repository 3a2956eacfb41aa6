//! Single-flight task runner
//!
//! At most one orchestrated operation runs at a time, system-wide. The
//! runner hands out a [`TaskPermit`] carrying the cancellation token;
//! dropping the permit returns the runner to idle and arms a fresh token
//! for the next task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::info;

use droidsync_core::domain::errors::SyncError;

/// Observable state of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    /// The token has fired but the task has not yet unwound
    Cancelling,
}

#[derive(Debug)]
struct RunnerInner {
    running: AtomicBool,
    token: Mutex<CancellationToken>,
}

/// Enforces single-flight execution with cooperative cancellation
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<RunnerInner>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                running: AtomicBool::new(false),
                token: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Claims the runner for one task.
    ///
    /// Fails with [`SyncError::TaskAlreadyRunning`] while another permit is
    /// live; the active task is unaffected by the rejected attempt.
    pub fn begin(&self) -> Result<TaskPermit, SyncError> {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SyncError::TaskAlreadyRunning);
        }

        let token = CancellationToken::new();
        *self
            .inner
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token.clone();

        Ok(TaskPermit {
            inner: self.inner.clone(),
            token,
        })
    }

    /// Fires the active task's cancellation token.
    ///
    /// Cooperative: the task observes the token at its next plan-item
    /// boundary, and an in-flight external-process call is hard-terminated
    /// by the bridge adapter. A no-op while idle.
    pub fn cancel(&self) {
        if self.inner.running.load(Ordering::Acquire) {
            info!("Cancellation requested");
            self.inner
                .token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .cancel();
        }
    }

    pub fn state(&self) -> TaskState {
        if !self.inner.running.load(Ordering::Acquire) {
            return TaskState::Idle;
        }
        let cancelled = self
            .inner
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_cancelled();
        if cancelled {
            TaskState::Cancelling
        } else {
            TaskState::Running
        }
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that the holder is the one running task
#[derive(Debug)]
pub struct TaskPermit {
    inner: Arc<RunnerInner>,
    token: CancellationToken,
}

impl TaskPermit {
    /// The cancellation token for this task.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for TaskPermit {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::Release);
    }
}
