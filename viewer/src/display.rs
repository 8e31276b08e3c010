use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::font;
use crate::remote::RemoteSaver;
use crate::session::CaptureSession;
use crate::store::{FrameStore, StreamStatus};

const WINDOW_TITLE: &str = "Robot Camera Stream - Ball Detection Dataset";
const FIRST_FRAME_POLL: Duration = Duration::from_millis(100);
const TARGET_FPS: usize = 30;
const OVERLAY_SCALE: usize = 2;

const GREEN: u32 = 0x00FF00;
const WHITE: u32 = 0xFFFFFF;
const RED: u32 = 0xFF4040;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
    #[error("stream ended before the first frame arrived: {0}")]
    NoFirstFrame(String),
}

pub fn print_instructions() {
    println!(
        "\n=== BALL DETECTION DATASET CAPTURE ===\n\
         Controls:\n\
         - S or SPACE: save image on the robot\n\
         - L: save image locally\n\
         - B: save both, under one shared filename\n\
         - H: show this help again\n\
         - Q or ESC: quit\n\n\
         Tip: vary the ball position, lighting and angle for a diverse dataset.\n"
    );
}

/// Display and input loop. Blocks the calling thread until the operator
/// quits, the window closes, or shutdown is requested.
pub fn run<R: RemoteSaver>(
    store: Arc<FrameStore>,
    session: &mut CaptureSession<R>,
    shutdown: Arc<AtomicBool>,
) -> Result<(), DisplayError> {
    // Waiting state: poll until the first frame lands so the window can be
    // sized to the stream.
    let first = loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        if let Some(frame) = store.read_latest() {
            break frame;
        }
        if let StreamStatus::Lost { reason } = store.status() {
            return Err(DisplayError::NoFirstFrame(reason));
        }
        std::thread::sleep(FIRST_FRAME_POLL);
    };

    let (width, height) = first.dimensions();
    let mut window = Window::new(
        WINDOW_TITLE,
        width as usize,
        height as usize,
        WindowOptions::default(),
    )?;
    window.set_target_fps(TARGET_FPS);

    print_instructions();

    let mut stream_lost_logged = false;

    while window.is_open() && !shutdown.load(Ordering::Relaxed) {
        let status = store.status();
        if let StreamStatus::Lost { reason } = &status {
            if !stream_lost_logged {
                error!(reason, "video stream lost, still showing the last frame");
                stream_lost_logged = true;
            }
        }

        // A frame always exists past the waiting state.
        if let Some(frame) = store.read_latest() {
            let (fw, fh) = frame.dimensions();
            let mut buffer = rgb_to_argb(&frame);
            draw_overlay(
                &mut buffer,
                fw as usize,
                fh as usize,
                session.saved_count(),
                matches!(status, StreamStatus::Lost { .. }),
            );
            window.update_with_buffer(&buffer, fw as usize, fh as usize)?;
        }

        let mut quit = false;
        for key in window.get_keys_pressed(KeyRepeat::No) {
            match key {
                Key::Q | Key::Escape => quit = true,
                Key::S | Key::Space => {
                    session.save_remote();
                }
                Key::L => {
                    session.save_local();
                }
                Key::B => {
                    session.save_both();
                }
                Key::H => print_instructions(),
                _ => {}
            }
        }
        if quit {
            break;
        }
    }

    Ok(())
}

/// Convert an RGB frame to the packed ARGB buffer minifb wants.
fn rgb_to_argb(frame: &RgbImage) -> Vec<u32> {
    frame
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        })
        .collect()
}

fn draw_overlay(buffer: &mut [u32], width: usize, height: usize, saved: u64, lost: bool) {
    let line_height = font::GLYPH_HEIGHT * OVERLAY_SCALE;

    font::draw_text(
        buffer,
        width,
        height,
        10,
        10,
        &format!("Images saved: {saved}"),
        GREEN,
        OVERLAY_SCALE,
    );
    font::draw_text(
        buffer,
        width,
        height,
        10,
        height.saturating_sub(line_height + 10),
        "S save  L local  B both  H help  Q quit",
        WHITE,
        OVERLAY_SCALE,
    );
    if lost {
        let banner = "STREAM LOST";
        let x = width.saturating_sub(font::text_width(banner, OVERLAY_SCALE)) / 2;
        font::draw_text(
            buffer,
            width,
            height,
            x,
            10 + line_height + 6,
            banner,
            RED,
            OVERLAY_SCALE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn argb_conversion_packs_channels() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([0x12, 0x34, 0x56]));
        frame.put_pixel(1, 0, Rgb([0xFF, 0x00, 0x00]));
        let buf = rgb_to_argb(&frame);
        assert_eq!(buf, vec![0x123456, 0xFF0000]);
    }

    #[test]
    fn overlay_marks_counter_and_loss() {
        let mut buf = vec![0u32; 320 * 240];
        draw_overlay(&mut buf, 320, 240, 7, true);
        assert!(buf.contains(&GREEN));
        assert!(buf.contains(&WHITE));
        assert!(buf.contains(&RED));
    }
}
