// Window + software text drawing.
// 1) A resizable window that shows the composited frame and turns minifb
//    input polling into viewer events.
// 2) A tiny 5x7 bitmap font for the pixel value labels.

use crate::error::Error;
use crate::session::{Button, Event, Held, KeyCode, Modifiers};
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
    size: (usize, usize),
    buttons: [bool; 3],
    pointer: Option<(i32, i32)>,
    active: bool,
}

impl Drawer {
    /// Create a resizable window of the given size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, size: (width, height), buttons: [false; 3], pointer: None, active: true })
    }

    /// Push the pixels for this frame to the screen; also pumps the OS event queue.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift: self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift),
            control: self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl),
        }
    }

    /// Translate the input state gathered by the last `present` into events.
    pub fn poll_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let mods = self.modifiers();

        let (w, h) = self.window.get_size();
        if (w, h) != self.size && w > 0 && h > 0 {
            self.size = (w, h);
            events.push(Event::Resize { width: w, height: h });
        }
        // regaining focus asks for a repaint
        let active = self.window.is_active();
        if active && !self.active {
            events.push(Event::Expose);
        }
        self.active = active;

        let (x, y) = self
            .window
            .get_mouse_pos(MouseMode::Pass)
            .map(|(x, y)| (x.floor() as i32, y.floor() as i32))
            .unwrap_or((-1, -1));

        let buttons = [
            self.window.get_mouse_down(MouseButton::Left),
            self.window.get_mouse_down(MouseButton::Middle),
            self.window.get_mouse_down(MouseButton::Right),
        ];
        // rising edges are presses
        for (k, button) in [Button::Left, Button::Middle, Button::Right].into_iter().enumerate() {
            if buttons[k] && !self.buttons[k] {
                events.push(Event::Press { button, x, y, mods });
            }
        }
        self.buttons = buttons;
        let held = Held { left: buttons[0], middle: buttons[1] };

        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy > 0.0 {
                events.push(Event::Press { button: Button::WheelUp, x, y, mods });
            } else if dy < 0.0 {
                events.push(Event::Press { button: Button::WheelDown, x, y, mods });
            }
        }

        if x >= 0 && y >= 0 && self.pointer != Some((x, y)) {
            self.pointer = Some((x, y));
            events.push(Event::Motion { x, y, held, mods });
        }

        for key in self.window.get_keys_pressed(KeyRepeat::Yes) {
            if let Some(key) = translate_key(key, mods.shift) {
                events.push(Event::Key { key, x, y, mods });
            }
        }
        events
    }
}

/// minifb key -> viewer key. Letters are upper case with shift held.
fn translate_key(key: Key, shift: bool) -> Option<KeyCode> {
    let letter = |c: char| Some(KeyCode::Char(if shift { c.to_ascii_uppercase() } else { c }));
    match key {
        Key::Escape => Some(KeyCode::Escape),
        Key::Left => Some(KeyCode::Left),
        Key::Right => Some(KeyCode::Right),
        Key::Up => Some(KeyCode::Up),
        Key::Down => Some(KeyCode::Down),
        Key::PageUp => Some(KeyCode::PageUp),
        Key::PageDown => Some(KeyCode::PageDown),
        Key::NumPadPlus => Some(KeyCode::Char('+')),
        Key::NumPadMinus | Key::Minus => Some(KeyCode::Char('-')),
        Key::Equal if shift => Some(KeyCode::Char('+')),
        Key::M => letter('m'),
        Key::N => letter('n'),
        Key::P => letter('p'),
        Key::Q => letter('q'),
        Key::R => letter('r'),
        _ => None,
    }
}

/* ---------- Software drawing: tiny bitmap font ---------- */

/// Horizontal advance of one glyph: 5 pixels + 1 spacing.
pub const GLYPH_ADVANCE: i32 = 6;
const GLYPH_CELL_HEIGHT: i32 = 8;

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
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

/// Return a 5x7 glyph bitmap for the characters numeric labels use.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
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

        // exponent, nan, inf
        'e' => g!(0b00000,0b00000,0b01110,0b10001,0b11111,0b10000,0b01110),
        'n' => g!(0b00000,0b00000,0b10110,0b11001,0b10001,0b10001,0b10001),
        'a' => g!(0b00000,0b00000,0b01110,0b00001,0b01111,0b10001,0b01111),
        'i' => g!(0b00100,0b00000,0b01100,0b00100,0b00100,0b00100,0b01110),
        'f' => g!(0b00110,0b01001,0b01000,0b11100,0b01000,0b01000,0b01000),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character with its top-left cell corner at (x,y).
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, fg: u32, bg: Option<u32>) {
    if let Some(bg) = bg {
        for ry in 0..GLYPH_CELL_HEIGHT {
            for rx in 0..GLYPH_ADVANCE {
                put_pixel(fb, x + rx, y + ry, bg);
            }
        }
    }
    if let Some(rows) = glyph5x7(ch) {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + 1, y + ry as i32, fg);
                }
            }
        }
    }
}

/// Draw a text string; pixels outside the frame are dropped.
pub fn draw_text(fb: &mut FrameBuffer, mut x: i32, y: i32, fg: u32, bg: Option<u32>, text: &str) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, fg, bg);
        x += GLYPH_ADVANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_paints_background_cells_and_clips() {
        let mut fb = FrameBuffer::new(20, 10);
        draw_text(&mut fb, 15, 0, 0x00_00_FF_00, Some(0x00_11_11_11), "10");
        // left column of the '1' cell is background
        assert_eq!(fb.pixels[15], 0x00_11_11_11);
        // '1' has its top pixel in glyph column 2 -> x = 15 + 1 + 2
        assert_eq!(fb.pixels[18], 0x00_00_FF_00);
        // nothing wrapped onto the next row start
        assert_eq!(fb.pixels[20], 0);
    }

    #[test]
    fn shifted_letters_become_upper_case() {
        assert_eq!(translate_key(Key::P, true), Some(KeyCode::Char('P')));
        assert_eq!(translate_key(Key::P, false), Some(KeyCode::Char('p')));
        assert_eq!(translate_key(Key::Equal, true), Some(KeyCode::Char('+')));
        assert_eq!(translate_key(Key::Equal, false), None);
    }
}
