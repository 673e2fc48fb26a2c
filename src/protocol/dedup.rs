use std::time::{Duration, Instant};

use bytes::Bytes;

/// Drops RF frames repeated within a configurable window.
///
/// The W800RF32 re-delivers each RF transmission several times back to back.
/// One remembered frame is enough to swallow the repeats: a frame identical
/// to the last accepted one is rejected while the window is open, and every
/// accepted frame overwrites the memory.
#[derive(Debug)]
pub struct DuplicateSuppressor {
    /// Last accepted frame and when it was accepted
    last: Option<(Bytes, Instant)>,
    /// Window within which an identical frame counts as a repeat
    min_repeat_delay: Duration,
}

impl DuplicateSuppressor {
    /// Creates a suppressor with the given repeat window
    pub fn new(min_repeat_delay: Duration) -> Self {
        DuplicateSuppressor {
            last: None,
            min_repeat_delay,
        }
    }

    /// Decides whether `frame` should be processed at time `now`.
    ///
    /// Accepting mutates the remembered frame unconditionally; rejecting
    /// leaves it untouched so a burst of repeats is measured from the first
    /// accepted copy.
    pub fn accept(&mut self, frame: &Bytes, now: Instant) -> bool {
        if let Some((last_frame, accepted_at)) = &self.last {
            if last_frame == frame && now.duration_since(*accepted_at) < self.min_repeat_delay {
                return false;
            }
        }
        self.last = Some((frame.clone(), now));
        true
    }

    /// The configured repeat window
    pub fn min_repeat_delay(&self) -> Duration {
        self.min_repeat_delay
    }

    /// Forgets the remembered frame (used on explicit disconnect)
    pub fn reset(&mut self) {
        self.last = None;
    }
}
