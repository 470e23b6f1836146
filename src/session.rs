//! Interaction state machine.
//!
//! A [`Session`] owns the view and ROI parameters for one viewer run. Input
//! arrives as abstract [`Event`]s; every event that changes what is on screen
//! sets a dirty flag that the next render pass consumes.

use std::fmt;

use crate::config::ViewerConfig;
use crate::pixel;
use crate::roi::RoiState;
use crate::source::PyramidSource;
use crate::types::Rgb;
use crate::view::ViewState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

/// Buttons held during a pointer move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Held {
    pub left: bool,
    pub middle: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Expose,
    Resize { width: usize, height: usize },
    Motion { x: i32, y: i32, held: Held, mods: Modifiers },
    Press { button: Button, x: i32, y: i32, mods: Modifiers },
    Key { key: KeyCode, x: i32, y: i32, mods: Modifiers },
}

/// Image value under a window pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueReport {
    pub x: f64,
    pub y: f64,
    pub rgb: Rgb,
}

impl fmt::Display for ValueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t: {}\t{}\t{}", self.x, self.y, self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

pub struct Session {
    pub view: ViewState,
    pub roi: RoiState,
    width: usize,
    height: usize,
    config: ViewerConfig,
    last_pointer: Option<(i32, i32)>,
    dirty: bool,
    quit: bool,
}

impl Session {
    pub fn new(config: ViewerConfig, width: usize, height: usize) -> Self {
        let roi = RoiState::new(width as i32 / 2, height as i32 / 2, config.initial_roi_size);
        let mut s = Self {
            view: ViewState::default(),
            roi,
            width,
            height,
            config,
            last_pointer: None,
            dirty: true,
            quit: false,
        };
        s.reset_all();
        s
    }

    /// Returns whether a redraw is due and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Value of the image under window pixel `(x, y)`, if it lies inside the window.
    pub fn query_value<S: PyramidSource + ?Sized>(&self, src: &S, x: i32, y: i32) -> Option<ValueReport> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        let (ix, iy) = self.view.window_to_image(x as f64, y as f64);
        let rgb = pixel::evaluate(src, self.view.zoom_factor, ix, iy);
        Some(ValueReport { x: ix, y: iy, rgb })
    }

    pub fn handle<S: PyramidSource + ?Sized>(&mut self, src: &S, event: Event) {
        match event {
            Event::Expose => self.dirty = true,
            Event::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.dirty = true;
            }
            Event::Motion { x, y, held, mods } => self.on_motion(src, x, y, held, mods),
            Event::Press { button, x, y, mods } => self.on_press(src, button, x, y, mods),
            Event::Key { key, x, y, mods } => self.on_key(key, x, y, mods),
        }
    }

    fn on_motion<S: PyramidSource + ?Sized>(&mut self, src: &S, x: i32, y: i32, held: Held, mods: Modifiers) {
        let (ox, oy) = self.last_pointer.unwrap_or((x, y));
        self.last_pointer = Some((x, y));

        if held.left && (x, y) != (ox, oy) {
            self.view.pan((x - ox) as f64, (y - oy) as f64);
            self.dirty = true;
        }
        if held.middle {
            self.report_value(src, x, y);
        }
        if mods.shift {
            self.center_contrast_at(src, x, y);
        }
        if self.roi.follow(x, y) {
            self.dirty = true;
        }
    }

    fn on_press<S: PyramidSource + ?Sized>(&mut self, src: &S, button: Button, x: i32, y: i32, mods: Modifiers) {
        self.last_pointer = Some((x, y));
        let wheel = matches!(button, Button::WheelUp | Button::WheelDown);
        let up = button == Button::WheelUp;

        if wheel && self.roi.mode.is_active() {
            self.roi.resize(if up { 2 } else { -2 });
            self.dirty = true;
            return;
        }
        if wheel && mods.shift {
            let f = self.config.contrast_span_factor;
            self.view.contrast_span(if up { 1.0 / f } else { f });
            self.dirty = true;
            return;
        }
        if button == Button::Right && mods.control {
            self.zoom_at(x as f64, y as f64, 1.0 / self.view.zoom_factor);
            return;
        }
        match button {
            Button::Middle => self.report_value(src, x, y),
            Button::WheelUp => self.zoom_at(x as f64, y as f64, self.config.wheel_factor),
            Button::WheelDown => self.zoom_at(x as f64, y as f64, 1.0 / self.config.wheel_factor),
            Button::Right => self.reset_all(),
            Button::Left => {}
        }
    }

    fn on_key(&mut self, key: KeyCode, x: i32, y: i32, mods: Modifiers) {
        let (cx, cy) = ((self.width / 2) as f64, (self.height / 2) as f64);
        match key {
            KeyCode::Char('+') => self.zoom_at(cx, cy, self.config.wheel_factor),
            KeyCode::Char('-') => self.zoom_at(cx, cy, 1.0 / self.config.wheel_factor),
            KeyCode::Char('p') => self.zoom_at(cx, cy, self.config.fine_zoom_factor),
            KeyCode::Char('m') => self.zoom_at(cx, cy, 1.0 / self.config.fine_zoom_factor),
            KeyCode::Char('P') => self.zoom_at(cx, cy, self.config.finer_zoom_factor),
            KeyCode::Char('M') => self.zoom_at(cx, cy, 1.0 / self.config.finer_zoom_factor),
            KeyCode::Char('n') => {
                self.view.auto_contrast(self.config.dynamic_range);
                self.dirty = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let (px, py) = self.last_pointer.unwrap_or((x, y));
                self.roi.cycle(mods.shift || key == KeyCode::Char('R'), px, py);
                self.dirty = true;
            }
            KeyCode::Char('q') | KeyCode::Escape => self.quit = true,
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                let mut inc = -self.config.pan_step;
                if mods.shift {
                    inc /= 10;
                }
                if mods.control {
                    inc *= 10;
                }
                let (dx, dy) = match key {
                    KeyCode::Left => (-inc, 0),
                    KeyCode::Right => (inc, 0),
                    KeyCode::Up => (0, -inc),
                    _ => (0, inc),
                };
                self.view.pan(dx as f64, dy as f64);
                self.dirty = true;
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                let d = (self.height / 3) as f64;
                self.view.pan(0.0, if key == KeyCode::PageUp { d } else { -d });
                self.dirty = true;
            }
            KeyCode::Char(_) => {}
        }
    }

    fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.view.zoom_about(x, y, factor);
        tracing::debug!("zoom changed {}", self.view.zoom_factor);
        self.dirty = true;
    }

    fn center_contrast_at<S: PyramidSource + ?Sized>(&mut self, src: &S, x: i32, y: i32) {
        let (ix, iy) = self.view.window_to_image(x as f64, y as f64);
        let rgb = pixel::evaluate(src, self.view.zoom_factor, ix, iy);
        self.view.center_contrast_on(rgb);
        self.dirty = true;
    }

    fn report_value<S: PyramidSource + ?Sized>(&self, src: &S, x: i32, y: i32) {
        if let Some(report) = self.query_value(src, x, y) {
            println!("{report}");
        }
    }

    /// Identity view and contrast, ROI off and back at the window center.
    fn reset_all(&mut self) {
        self.view = ViewState::default();
        self.roi = RoiState::new(
            self.width as i32 / 2,
            self.height as i32 / 2,
            self.config.initial_roi_size,
        );
        self.dirty = true;
    }
}
