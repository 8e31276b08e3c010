use chrono::{DateTime, Local};

/// Wire format for the video stream socket:
///
///   [0..4]  payload_len  (u32 big-endian)
///   [4..]   payload      (encoded image bytes, exactly payload_len long)
///
/// Frames repeat back to back with no other delimiters, so a reader must
/// consume exactly `LENGTH_PREFIX_SIZE + payload_len` bytes per frame to
/// stay aligned with the stream.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Upper bound on a single frame payload. The camera streams sub-megabyte
/// JPEGs; anything larger means the prefix was read out of alignment.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Serialize one frame payload with its length prefix.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Parse the 4-byte length prefix, validating it against [`MAX_PAYLOAD_SIZE`].
pub fn parse_length_prefix(prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize, FrameError> {
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge {
            got: len,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(len)
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame payload of {got} bytes exceeds maximum of {max}")]
    PayloadTooLarge { got: usize, max: usize },
}

/// Generate a capture filename for a locally saved image.
/// e.g. "ball_dataset_0001_20260830_142733_512.jpg"
pub fn capture_filename(prefix: &str, seq: u32, at: DateTime<Local>) -> String {
    format!("{prefix}_{seq:04}_{ts}.jpg", ts = at.format("%Y%m%d_%H%M%S_%3f"))
}

/// Same as [`capture_filename`] using the current wall-clock time.
pub fn capture_filename_now(prefix: &str, seq: u32) -> String {
    capture_filename(prefix, seq, Local::now())
}
