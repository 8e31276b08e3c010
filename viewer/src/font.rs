//! Minimal 5x7 bitmap font for overlay text on the video frame.
//!
//! Glyphs are stored column-major, five bytes per glyph, least significant
//! bit at the top row. Covers printable ASCII from space through 'Z';
//! lowercase input is folded to uppercase, anything else renders as space.

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// One column of spacing between glyphs.
pub const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;

const FIRST_GLYPH: u8 = b' ';
const LAST_GLYPH: u8 = b'Z';

#[rustfmt::skip]
static GLYPHS: [[u8; GLYPH_WIDTH]; (LAST_GLYPH - FIRST_GLYPH + 1) as usize] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x00, 0x08, 0x14, 0x22, 0x41], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x41, 0x22, 0x14, 0x08, 0x00], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x01, 0x01], // 'F'
    [0x3E, 0x41, 0x41, 0x51, 0x32], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x03, 0x04, 0x78, 0x04, 0x03], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
];

fn glyph_for(ch: char) -> &'static [u8; GLYPH_WIDTH] {
    let ch = ch.to_ascii_uppercase();
    let code = if ch.is_ascii() { ch as u8 } else { b' ' };
    if (FIRST_GLYPH..=LAST_GLYPH).contains(&code) {
        &GLYPHS[(code - FIRST_GLYPH) as usize]
    } else {
        &GLYPHS[0]
    }
}

/// Draw a line of text into a packed ARGB buffer. Pixels falling outside the
/// buffer are clipped, not wrapped.
pub fn draw_text(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    text: &str,
    color: u32,
    scale: usize,
) {
    let mut pen_x = x;
    for ch in text.chars() {
        let glyph = glyph_for(ch);
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits >> row & 1 == 0 {
                    continue;
                }
                let px = pen_x + col * scale;
                let py = y + row * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (sx, sy) = (px + dx, py + dy);
                        if sx < width && sy < height {
                            buffer[sy * width + sx] = color;
                        }
                    }
                }
            }
        }
        pen_x += GLYPH_ADVANCE * scale;
    }
}

/// Pixel width of a rendered line at the given scale.
pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * GLYPH_ADVANCE * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_pixels_in_color() {
        let mut buf = vec![0u32; 32 * 16];
        draw_text(&mut buf, 32, 16, 0, 0, "I", 0x00FF00, 1);
        // 'I' has a solid middle column
        assert_eq!(buf[2], 0x00FF00);
        assert!(buf.iter().any(|&p| p == 0x00FF00));
    }

    #[test]
    fn clips_at_buffer_edges() {
        let mut buf = vec![0u32; 8 * 8];
        // would extend far past an 8x8 buffer; must not panic
        draw_text(&mut buf, 8, 8, 4, 4, "WWWW", 0xFFFFFF, 3);
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        let mut upper = vec![0u32; 16 * 8];
        let mut lower = vec![0u32; 16 * 8];
        draw_text(&mut upper, 16, 8, 0, 0, "A", 0xFFFFFF, 1);
        draw_text(&mut lower, 16, 8, 0, 0, "a", 0xFFFFFF, 1);
        assert_eq!(upper, lower);
    }

    #[test]
    fn width_accounts_for_advance() {
        assert_eq!(text_width("QUIT", 2), 4 * 6 * 2);
    }
}
