use image::RgbImage;
use std::sync::Mutex;

/// What the display loop can observe about the stream socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// Connected, no frame decoded yet.
    Waiting,
    /// At least one frame has been published.
    Live,
    /// The receiver loop ended. The slot keeps the last published frame.
    Lost { reason: String },
}

/// Single-slot store for the most recent decoded frame.
///
/// The receiver task publishes into it, the display loop reads from it; only
/// the latest frame is retained. The one lock guards both the slot and the
/// stream status so a reader never sees a frame without its matching status.
pub struct FrameStore {
    inner: Mutex<Inner>,
}

struct Inner {
    frame: Option<RgbImage>,
    status: StreamStatus,
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                frame: None,
                status: StreamStatus::Waiting,
            }),
        }
    }

    /// Replace the current frame with a newly decoded one.
    pub fn publish(&self, frame: RgbImage) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.frame = Some(frame);
        if inner.status == StreamStatus::Waiting {
            inner.status = StreamStatus::Live;
        }
    }

    /// Copy of the current frame, or `None` if nothing has arrived yet.
    /// The clone happens under the lock; callers never hold it during I/O.
    pub fn read_latest(&self) -> Option<RgbImage> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.frame.clone()
    }

    /// Mark the stream as dead. Called by the receiver task on exit so the
    /// display loop can tell a stalled stream from a slow one.
    pub fn mark_lost(&self, reason: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.status = StreamStatus::Lost {
            reason: reason.into(),
        };
    }

    pub fn status(&self) -> StreamStatus {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.status.clone()
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}
