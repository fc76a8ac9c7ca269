// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error taxonomy for callback failures surfaced by the scheduler.
//!
//! Configuration warnings and ordering anomalies are never errors: they are
//! logged and the operation degrades. Only failures raised *by user code*
//! during a tick are materialized as a [`SchedulerError`] and forwarded to a
//! root's error handler.

use std::fmt;
use thiserror::Error;

/// Where a global hook runs relative to the per-root jobs of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Runs once per tick before any root's jobs.
    Before,
    /// Runs once per tick after every root's jobs.
    After,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Before => write!(f, "before"),
            HookStage::After => write!(f, "after"),
        }
    }
}

/// A failure caught while dispatching user callbacks.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job callback returned an error.
    #[error("job '{job_id}' on root '{root_id}' failed: {error}")]
    JobFailed {
        /// The failing job.
        job_id: String,
        /// The root that owns the job.
        root_id: String,
        /// The error returned by the callback.
        error: anyhow::Error,
    },
    /// A job callback panicked.
    #[error("job '{job_id}' on root '{root_id}' panicked: {message}")]
    JobPanicked {
        /// The failing job.
        job_id: String,
        /// The root that owns the job.
        root_id: String,
        /// The panic payload, rendered as text.
        message: String,
    },
    /// A global before/after hook returned an error.
    #[error("global {stage} hook '{hook_id}' failed: {error}")]
    HookFailed {
        /// Whether the hook runs before or after the roots.
        stage: HookStage,
        /// The hook identifier.
        hook_id: String,
        /// The error returned by the hook.
        error: anyhow::Error,
    },
    /// A global before/after hook panicked.
    #[error("global {stage} hook '{hook_id}' panicked: {message}")]
    HookPanicked {
        /// Whether the hook runs before or after the roots.
        stage: HookStage,
        /// The hook identifier.
        hook_id: String,
        /// The panic payload, rendered as text.
        message: String,
    },
    /// An error raised explicitly through `trigger_error`.
    #[error(transparent)]
    Triggered(#[from] anyhow::Error),
}

impl SchedulerError {
    /// Returns the id of the job that failed, if a job was involved.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            SchedulerError::JobFailed { job_id, .. } | SchedulerError::JobPanicked { job_id, .. } => {
                Some(job_id)
            }
            _ => None,
        }
    }

    /// Returns the underlying user error, when the failure was not a panic.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            SchedulerError::JobFailed { error, .. } | SchedulerError::HookFailed { error, .. } => {
                Some(error)
            }
            SchedulerError::Triggered(error) => Some(error),
            _ => None,
        }
    }

    /// Renders a panic payload caught by `catch_unwind` as text.
    pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_failure_display_names_job_and_root() {
        let err = SchedulerError::JobFailed {
            job_id: "physics".into(),
            root_id: "main".into(),
            error: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "job 'physics' on root 'main' failed: boom");
        assert_eq!(err.job_id(), Some("physics"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn triggered_error_is_transparent() {
        let err: SchedulerError = anyhow::anyhow!("lost context").into();
        assert_eq!(err.to_string(), "lost context");
        assert_eq!(err.job_id(), None);
    }

    #[test]
    fn panic_message_handles_both_string_kinds() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn std::any::Any + Send> = Box::new(42u32);
        assert_eq!(SchedulerError::panic_message(static_payload.as_ref()), "static");
        assert_eq!(SchedulerError::panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(
            SchedulerError::panic_message(other_payload.as_ref()),
            "non-string panic payload"
        );
    }

    #[test]
    fn hook_stage_display() {
        assert_eq!(HookStage::Before.to_string(), "before");
        assert_eq!(HookStage::After.to_string(), "after");
    }
}
