// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the augmented image, scaled to its slot, titled with the file path.
// 2) The control panel: sliders, fill-mode radio buttons, quit/start/stop buttons.
// 3) A tiny 5x7 bitmap font for every label and value on screen.
// The window is also where input comes from: mouse + keys become `Input`s.

use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::config::SimConfig;
use crate::controller::{Input, Panel};
use crate::error::Error;
use crate::render_loop::Surface;
use crate::types::{FrameBuffer, SourceImage};
use crate::widgets::{Button, RadioButtons, Rect, Slider};

const BACKGROUND: u32 = 0x00_FF_FF_FF;
const AXCOLOR: u32 = 0x00_FA_FA_D2; // light goldenrod yellow
const INK: u32 = 0x00_00_00_00;
const EDGE: u32 = 0x00_80_80_80;
const SLIDER_FILL: u32 = 0x00_64_95_ED;
const HOVER: u32 = 0x00_F8_F8_F8;

pub struct Drawer {
    window: Window,      // the on-screen window you see
    screen: FrameBuffer, // what gets pushed to it every present
    title: String,       // drawn above the image
    image_rect: Rect,
    mouse_was_down: bool,
    last_mouse: Option<(f32, f32)>,
}

impl Drawer {
    /// Create the window at the configured size.
    /// Visual: a new empty white window appears with your chosen title.
    pub fn new(window_title: &str, image_title: &str, config: &SimConfig) -> Result<Self, Error> {
        let (w, h) = (config.window_width, config.window_height);
        let window = Window::new(window_title, w, h, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self {
            window,
            screen: FrameBuffer::filled(w, h, BACKGROUND),
            title: image_title.to_string(),
            image_rect: config.image_rect,
            mouse_was_down: false,
            last_mouse: None,
        })
    }

    /// Mouse position in figure fractions (origin bottom-left), clamped to the window.
    fn mouse_fraction(&self) -> Option<(f32, f32)> {
        let (w, h) = (self.screen.width as f32, self.screen.height as f32);
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x / w, 1.0 - y / h))
    }

    /// Turn the current window state into inputs, edge-triggered on the left button.
    fn collect_inputs(&mut self) -> Vec<Input> {
        let mut inputs = Vec::new();
        if !self.window.is_open() {
            inputs.push(Input::Closed);
            return inputs;
        }
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            inputs.push(Input::QuitKey);
        }

        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.mouse_fraction();
        match (self.mouse_was_down, down, pos) {
            (false, true, Some((x, y))) => inputs.push(Input::PointerDown { x, y }),
            (true, true, Some((x, y))) if pos != self.last_mouse => inputs.push(Input::PointerMove { x, y }),
            (true, false, _) => inputs.push(Input::PointerUp),
            _ => {}
        }
        self.mouse_was_down = down;
        self.last_mouse = pos;
        inputs
    }
}

impl Surface for Drawer {
    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately shows the new image plus the panel.
    fn present(&mut self, frame: &SourceImage, panel: &Panel) -> Result<(), Error> {
        let hover = self.mouse_fraction();
        let fb = &mut self.screen;
        fb.pixels.fill(BACKGROUND);

        blit_fit(fb, frame, self.image_rect);
        let (ix, iy, iw, _) = self.image_rect.to_pixels(fb.width, fb.height);
        let title_x = ix + (iw - text_width(&self.title)) / 2;
        draw_text_5x7(fb, title_x.max(2), iy - 12, &self.title, INK);

        for s in panel.sliders() {
            draw_slider(fb, s, "");
        }
        draw_slider(fb, panel.interval(), "s");
        draw_radio(fb, panel.fill_mode());
        for b in panel.buttons() {
            let hovered = hover.is_some_and(|(x, y)| b.rect().contains(x, y));
            draw_button(fb, b, hovered);
        }

        self.window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Sleep, pump the window's event queue, report what happened.
    fn wait_events(&mut self, budget: Duration) -> Result<Vec<Input>, Error> {
        std::thread::sleep(budget);
        self.window.update();
        Ok(self.collect_inputs())
    }
}

/* ---------- Software drawing: pixels, lines, boxes, discs ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// 1-pixel frame around a box.
fn stroke_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let (x1, y1) = (x + w - 1, y + h - 1);
    draw_line(fb, x, y, x1, y, color);
    draw_line(fb, x, y1, x1, y1, color);
    draw_line(fb, x, y, x, y1, color);
    draw_line(fb, x1, y, x1, y1, color);
}

/// Visual: a ring when `filled` is false, a solid dot when true.
fn draw_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, r: i32, color: u32, filled: bool) {
    let outer = (r * r) as f32;
    let inner = ((r - 1) * (r - 1)) as f32;
    for y in -r..=r {
        for x in -r..=r {
            let d2 = (x * x + y * y) as f32;
            if d2 <= outer && (filled || d2 > inner) {
                put_pixel(fb, cx + x, cy + y, color);
            }
        }
    }
}

/// Scale `img` into `rect`, keeping its aspect ratio, nearest-neighbour.
/// Visual: the image sits centered in its slot, letterboxed if needed.
fn blit_fit(fb: &mut FrameBuffer, img: &SourceImage, rect: Rect) {
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 {
        return;
    }
    let (rx, ry, rw, rh) = rect.to_pixels(fb.width, fb.height);
    let scale = (rw as f32 / iw as f32).min(rh as f32 / ih as f32);
    let dw = ((iw as f32 * scale) as i32).max(1);
    let dh = ((ih as f32 * scale) as i32).max(1);
    let (ox, oy) = (rx + (rw - dw) / 2, ry + (rh - dh) / 2);

    for dy in 0..dh {
        let sy = ((dy as f32 / scale) as u32).min(ih - 1);
        for dx in 0..dw {
            let sx = ((dx as f32 / scale) as u32).min(iw - 1);
            put_pixel(fb, ox + dx, oy + dy, img.packed_rgb(sx, sy));
        }
    }
}

/* ---------- Widgets ---------- */

/// Visual: a goldenrod track, blue fill up to the value, label on the left,
/// value on the right (matplotlib-style).
fn draw_slider(fb: &mut FrameBuffer, s: &Slider, unit: &str) {
    let (x, y, w, h) = s.rect().to_pixels(fb.width, fb.height);
    fill_rect(fb, x, y, w, h, AXCOLOR);
    let filled = (s.fraction() * w as f32).round() as i32;
    fill_rect(fb, x, y, filled, h, SLIDER_FILL);
    stroke_rect(fb, x, y, w, h, EDGE);

    let ty = y + (h - 7) / 2;
    draw_text_5x7(fb, x - 6 - text_width(s.name()), ty, s.name(), INK);
    let value = format!("{:.2}{unit}", s.current_value());
    draw_text_5x7(fb, x + w + 6, ty, &value, INK);
}

/// Visual: one ring per label, the active one filled in.
fn draw_radio(fb: &mut FrameBuffer, radio: &RadioButtons) {
    let (x, y, w, h) = radio.rect().to_pixels(fb.width, fb.height);
    fill_rect(fb, x, y, w, h, AXCOLOR);
    stroke_rect(fb, x, y, w, h, EDGE);

    let labels = radio.labels();
    if labels.is_empty() {
        return;
    }
    let row_h = h / labels.len() as i32;
    for (i, label) in labels.iter().enumerate() {
        let cy = y + row_h * i as i32 + row_h / 2;
        let active = i == radio.active();
        draw_disc(fb, x + 10, cy, 5, if active { SLIDER_FILL } else { INK }, active);
        draw_text_5x7(fb, x + 20, cy - 3, label, INK);
    }
}

/// Visual: a goldenrod box with a centered label, lighter while hovered.
fn draw_button(fb: &mut FrameBuffer, b: &Button, hovered: bool) {
    let (x, y, w, h) = b.rect().to_pixels(fb.width, fb.height);
    fill_rect(fb, x, y, w, h, if hovered { HOVER } else { AXCOLOR });
    stroke_rect(fb, x, y, w, h, EDGE);
    let tx = x + (w - text_width(b.label())) / 2;
    draw_text_5x7(fb, tx, y + (h - 7) / 2, b.label(), INK);
}

/* ---------- 5x7 bitmap font (uppercase, digits, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase maps to uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Letters A..Z
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b10001,0b01010,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation for paths and values
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b01000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '\\' => g!(0b10000,0b10000,0b01000,0b00100,0b00010,0b00001,0b00001),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Width in pixels of `text` drawn with `draw_text_5x7`.
fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

/// Draw a single 5x7 character at (x,y).
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
/// Visual: each glyph is 5x7 with 1-pixel spacing; unknown characters leave a gap.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
