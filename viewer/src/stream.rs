use ball_capture_common::frame::{parse_length_prefix, FrameError, LENGTH_PREFIX_SIZE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info, warn};

use crate::store::FrameStore;

#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("connection lost")]
    ConnectionLost,
    #[error("stream read error: {0}")]
    Read(std::io::Error),
    #[error("bad frame: {0}")]
    Frame(#[from] FrameError),
}

/// Read exactly one length-prefixed payload from the stream.
///
/// Consumes 4 bytes of prefix plus exactly the announced payload length,
/// however the transport fragments them. A socket that closes before the
/// frame completes yields [`ReceiverError::ConnectionLost`].
pub async fn read_frame_payload<R>(stream: &mut R) -> Result<Vec<u8>, ReceiverError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    stream.read_exact(&mut prefix).await.map_err(map_read_err)?;
    let len = parse_length_prefix(prefix)?;

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.map_err(map_read_err)?;
    Ok(payload)
}

fn map_read_err(e: std::io::Error) -> ReceiverError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ReceiverError::ConnectionLost
    } else {
        ReceiverError::Read(e)
    }
}

/// Frame receiver loop. Runs until the stream dies or shutdown is requested;
/// marks the store lost on the way out so the display loop can tell.
pub async fn run_receiver<R>(mut stream: R, store: Arc<FrameStore>, shutdown: Arc<AtomicBool>)
where
    R: AsyncRead + Unpin,
{
    match receive_frames(&mut stream, &store, &shutdown).await {
        Ok(()) => {
            info!("frame receiver stopped");
        }
        Err(e) => {
            if !shutdown.load(Ordering::Relaxed) {
                error!(error = %e, "frame receiving error");
            }
            store.mark_lost(e.to_string());
        }
    }
}

async fn receive_frames<R>(
    stream: &mut R,
    store: &FrameStore,
    shutdown: &AtomicBool,
) -> Result<(), ReceiverError>
where
    R: AsyncRead + Unpin,
{
    let mut published: u64 = 0;

    while !shutdown.load(Ordering::Relaxed) {
        let payload = read_frame_payload(stream).await?;

        // A truncated or garbled payload is a bad frame, not a dead stream:
        // log it and move on to the next length prefix.
        match image::load_from_memory(&payload) {
            Ok(img) => {
                store.publish(img.to_rgb8());
                published += 1;
                if published % 100 == 0 {
                    debug!(published, "frames published");
                }
            }
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "failed to decode frame, skipping");
            }
        }
    }

    Ok(())
}
