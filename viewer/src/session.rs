use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::remote::RemoteSaver;
use crate::save::LocalSaveWriter;
use crate::store::FrameStore;

/// Coordinates the remote and local save paths and owns the save counter.
///
/// Counter rules: a successful remote save counts, a local-only save does
/// not, and a combined save counts once when either side succeeds.
pub struct CaptureSession<R: RemoteSaver> {
    store: Arc<FrameStore>,
    remote: R,
    local: LocalSaveWriter,
    saved: u64,
}

impl<R: RemoteSaver> CaptureSession<R> {
    pub fn new(store: Arc<FrameStore>, remote: R, local: LocalSaveWriter) -> Self {
        Self {
            store,
            remote,
            local,
            saved: 0,
        }
    }

    pub fn saved_count(&self) -> u64 {
        self.saved
    }

    pub fn local_dir(&self) -> &Path {
        self.local.dir()
    }

    /// Ask the robot to capture an image on its side.
    pub fn save_remote(&mut self) -> bool {
        let ok = self.remote.save(None);
        if ok {
            self.saved += 1;
        }
        ok
    }

    /// Write the currently displayed frame to the local dataset directory.
    pub fn save_local(&mut self) -> bool {
        let Some(frame) = self.store.read_latest() else {
            warn!("no frame available to save");
            return false;
        };
        match self.local.save(&frame, None) {
            Ok(path) => {
                info!(path = %path.display(), "image saved locally");
                true
            }
            Err(e) => {
                warn!(error = %e, "local save failed");
                false
            }
        }
    }

    /// Capture on both sides under one shared filename so the remote and
    /// local copies of the same moment can be matched up later.
    pub fn save_both(&mut self) -> bool {
        let filename = self.local.generate_filename();

        let remote_ok = self.remote.save(Some(&filename));
        let local_ok = match self.store.read_latest() {
            Some(frame) => match self.local.save(&frame, Some(&filename)) {
                Ok(path) => {
                    info!(path = %path.display(), "image saved locally");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "local save failed");
                    false
                }
            },
            None => {
                warn!("no frame available to save");
                false
            }
        };

        let ok = remote_ok || local_ok;
        if ok {
            self.saved += 1;
        }
        ok
    }
}
