//! Candidate-side recording flow.
//!
//! Models the microphone/camera capture that precedes an upload: permission,
//! a capped recording, review of the captured blob, and the upload itself.
//! One recorder drives one session at a time.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::users::repo_types::MediaKind;

/// Longest allowed recording.
pub const MAX_RECORDING: Duration = Duration::from_secs(300);

/// Simulated progress never passes this until the server answers.
const PROGRESS_CEILING: u8 = 90;
const PROGRESS_STEP: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    PermissionRequested,
    PermissionDenied,
    /// Device access granted, nothing captured yet.
    Ready,
    Recording { elapsed: Duration },
    Stopped { blob: Bytes, duration: Duration },
    Uploading { blob: Bytes, duration: Duration, progress: u8 },
    Done { url: String },
}

impl RecordingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PermissionRequested => "permission_requested",
            Self::PermissionDenied => "permission_denied",
            Self::Ready => "ready",
            Self::Recording { .. } => "recording",
            Self::Stopped { .. } => "stopped",
            Self::Uploading { .. } => "uploading",
            Self::Done { .. } => "done",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordingError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

pub type RecordingResult<T> = Result<T, RecordingError>;

#[derive(Debug)]
pub struct Recorder {
    kind: MediaKind,
    limit: Duration,
    state: RecordingState,
}

impl Recorder {
    pub fn new(kind: MediaKind) -> Self {
        Self::with_limit(kind, MAX_RECORDING)
    }

    pub fn with_limit(kind: MediaKind, limit: Duration) -> Self {
        Self {
            kind,
            limit,
            state: RecordingState::Idle,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Time left before the cap, while recording.
    pub fn remaining(&self) -> Option<Duration> {
        match &self.state {
            RecordingState::Recording { elapsed } => Some(self.limit.saturating_sub(*elapsed)),
            _ => None,
        }
    }

    fn invalid<T>(&self, action: &'static str) -> RecordingResult<T> {
        Err(RecordingError::InvalidTransition {
            state: self.state.as_str(),
            action,
        })
    }

    fn set(&mut self, next: RecordingState) {
        debug!(media = self.kind.as_str(), from = %self.state, to = %next, "recording transition");
        self.state = next;
    }

    pub fn request_permission(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::Idle | RecordingState::PermissionDenied => {
                self.set(RecordingState::PermissionRequested);
                Ok(())
            }
            _ => self.invalid("request permission"),
        }
    }

    pub fn grant(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::PermissionRequested => {
                self.set(RecordingState::Ready);
                Ok(())
            }
            _ => self.invalid("grant permission"),
        }
    }

    pub fn deny(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::PermissionRequested => {
                self.set(RecordingState::PermissionDenied);
                Ok(())
            }
            _ => self.invalid("deny permission"),
        }
    }

    pub fn start(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::Ready => {
                self.set(RecordingState::Recording {
                    elapsed: Duration::ZERO,
                });
                Ok(())
            }
            _ => self.invalid("start recording"),
        }
    }

    /// Advance the recording clock. Reaching the cap stops the recording
    /// with whatever has been captured so far; returns true when that
    /// happened.
    pub fn tick(&mut self, dt: Duration, captured: impl FnOnce() -> Bytes) -> RecordingResult<bool> {
        let RecordingState::Recording { elapsed } = self.state else {
            return self.invalid("tick");
        };
        let elapsed = elapsed.saturating_add(dt);
        if elapsed >= self.limit {
            let duration = self.limit;
            self.set(RecordingState::Stopped {
                blob: captured(),
                duration,
            });
            return Ok(true);
        }
        self.state = RecordingState::Recording { elapsed };
        Ok(false)
    }

    pub fn stop(&mut self, blob: Bytes) -> RecordingResult<()> {
        match self.state {
            RecordingState::Recording { elapsed } => {
                self.set(RecordingState::Stopped {
                    blob,
                    duration: elapsed,
                });
                Ok(())
            }
            _ => self.invalid("stop recording"),
        }
    }

    /// Hand the captured blob to the uploader.
    pub fn begin_upload(&mut self) -> RecordingResult<Bytes> {
        match &self.state {
            RecordingState::Stopped { blob, duration } => {
                let (blob, duration) = (blob.clone(), *duration);
                self.set(RecordingState::Uploading {
                    blob: blob.clone(),
                    duration,
                    progress: 0,
                });
                Ok(blob)
            }
            _ => self.invalid("upload"),
        }
    }

    /// Step the displayed progress; it stalls below 100 until the upload
    /// finishes.
    pub fn advance_upload(&mut self) -> RecordingResult<u8> {
        match &mut self.state {
            RecordingState::Uploading { progress, .. } => {
                *progress = (*progress + PROGRESS_STEP).min(PROGRESS_CEILING);
                Ok(*progress)
            }
            _ => self.invalid("advance upload"),
        }
    }

    pub fn finish_upload(&mut self, url: impl Into<String>) -> RecordingResult<()> {
        match self.state {
            RecordingState::Uploading { .. } => {
                self.set(RecordingState::Done { url: url.into() });
                Ok(())
            }
            _ => self.invalid("finish upload"),
        }
    }

    /// Upload failed: go back to review with the blob intact.
    pub fn fail_upload(&mut self) -> RecordingResult<()> {
        match &self.state {
            RecordingState::Uploading { blob, duration, .. } => {
                let next = RecordingState::Stopped {
                    blob: blob.clone(),
                    duration: *duration,
                };
                self.set(next);
                Ok(())
            }
            _ => self.invalid("fail upload"),
        }
    }

    /// Discard the take and ask for device access again.
    pub fn reset(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::Stopped { .. }
            | RecordingState::Done { .. }
            | RecordingState::PermissionDenied => {
                self.set(RecordingState::PermissionRequested);
                Ok(())
            }
            _ => self.invalid("reset"),
        }
    }
}

/// `m:ss` clock shown next to the recording.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
