// Widgets for the control panel: sliders, push buttons and one radio group.
// A widget only knows its rectangle, its own value and its callbacks.
// Callbacks never touch app state; they hand back a `Command` that the
// controller applies, so every mutation goes through one place.

use std::fmt;

/// Axis-aligned rectangle in figure fractions, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self { left, bottom, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.bottom && y <= self.bottom + self.height
    }

    /// Pixel rectangle (x, y_top, w, h) inside a window of `fw` x `fh`.
    /// Visual: y grows downwards on screen, so the bottom edge is flipped.
    pub fn to_pixels(&self, fw: usize, fh: usize) -> (i32, i32, i32, i32) {
        let (fw, fh) = (fw as f32, fh as f32);
        let x = (self.left * fw).round() as i32;
        let y = ((1.0 - self.bottom - self.height) * fh).round() as i32;
        let w = (self.width * fw).round() as i32;
        let h = (self.height * fh).round() as i32;
        (x, y, w.max(1), h.max(1))
    }
}

/// What a widget callback asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Re-read every slider into the parameters and the interval.
    SyncSliders,
    /// Store this fill-mode label verbatim.
    SetFillMode(String),
    Quit,
    Start,
    Stop,
}

/// Event names a callback can be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Changed,
    Clicked,
    /// Anything else. Binding it is logged and skipped.
    Unsupported(String),
}

impl From<&str> for WidgetEvent {
    fn from(name: &str) -> Self {
        match name {
            "on_changed" => WidgetEvent::Changed,
            "on_clicked" => WidgetEvent::Clicked,
            other => WidgetEvent::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for WidgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetEvent::Changed => f.write_str("on_changed"),
            WidgetEvent::Clicked => f.write_str("on_clicked"),
            WidgetEvent::Unsupported(name) => f.write_str(name),
        }
    }
}

pub type SliderCallback = Box<dyn Fn(f32) -> Command>;
pub type ClickCallback = Box<dyn Fn() -> Command>;
pub type RadioCallback = Box<dyn Fn(&str) -> Command>;

fn skip_binding(widget: &str, event: &WidgetEvent) -> bool {
    tracing::warn!(widget, %event, "name not found, binding skipped");
    false
}

/* ------------------------------- Slider ------------------------------- */

pub struct Slider {
    name: String,
    rect: Rect,
    min: f32,
    max: f32,
    value: f32,
    on_changed: Option<SliderCallback>,
}

impl Slider {
    pub fn new(name: &str, rect: Rect, min: f32, max: f32, init: f32) -> Self {
        Self { name: name.to_string(), rect, min, max, value: init.clamp(min, max), on_changed: None }
    }

    /// Attach the callback for `event`. Sliders only fire `on_changed`.
    /// Returns false when the binding was skipped.
    pub fn bind(&mut self, event: WidgetEvent, callback: SliderCallback) -> bool {
        match event {
            WidgetEvent::Changed => {
                self.on_changed = Some(callback);
                true
            }
            other => skip_binding(&self.name, &other),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn current_value(&self) -> f32 {
        self.value
    }

    /// Where the handle sits, 0.0 at `min` and 1.0 at `max`.
    pub fn fraction(&self) -> f32 {
        if self.max > self.min { (self.value - self.min) / (self.max - self.min) } else { 0.0 }
    }

    /// Move the handle; clamps to the range. Fires `on_changed` only when
    /// the value actually moved.
    pub fn set_value(&mut self, value: f32) -> Option<Command> {
        let value = value.clamp(self.min, self.max);
        if value == self.value {
            return None;
        }
        self.value = value;
        self.on_changed.as_ref().map(|cb| cb(value))
    }

    /// Pointer at figure x; the track spans the slider rectangle.
    pub fn set_from_pointer(&mut self, x: f32) -> Option<Command> {
        let t = ((x - self.rect.left) / self.rect.width).clamp(0.0, 1.0);
        self.set_value(self.min + t * (self.max - self.min))
    }
}

/* ------------------------------- Button ------------------------------- */

pub struct Button {
    label: String,
    rect: Rect,
    on_clicked: Option<ClickCallback>,
}

impl Button {
    pub fn new(label: &str, rect: Rect) -> Self {
        Self { label: label.to_string(), rect, on_clicked: None }
    }

    pub fn bind(&mut self, event: WidgetEvent, callback: ClickCallback) -> bool {
        match event {
            WidgetEvent::Clicked => {
                self.on_clicked = Some(callback);
                true
            }
            other => skip_binding(&self.label, &other),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn click(&self) -> Option<Command> {
        self.on_clicked.as_ref().map(|cb| cb())
    }
}

/* ---------------------------- Radio buttons ---------------------------- */

pub struct RadioButtons {
    labels: Vec<String>,
    rect: Rect,
    active: usize,
    on_clicked: Option<RadioCallback>,
}

impl RadioButtons {
    pub fn new(rect: Rect, labels: &[&str]) -> Self {
        Self { labels: labels.iter().map(|l| l.to_string()).collect(), rect, active: 0, on_clicked: None }
    }

    pub fn bind(&mut self, event: WidgetEvent, callback: RadioCallback) -> bool {
        match event {
            WidgetEvent::Clicked => {
                self.on_clicked = Some(callback);
                true
            }
            other => skip_binding("radio", &other),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Only used for drawing the filled dot.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Row under figure y; rows are evenly spaced, first label on top.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if self.labels.is_empty() || y < self.rect.bottom || y > self.rect.bottom + self.rect.height {
            return None;
        }
        let from_top = (self.rect.bottom + self.rect.height - y) / self.rect.height;
        let row = (from_top * self.labels.len() as f32) as usize;
        Some(row.min(self.labels.len() - 1))
    }

    /// Activate a row and fire `on_clicked` with its label (also when it
    /// was already active).
    pub fn select(&mut self, index: usize) -> Option<Command> {
        let label = self.labels.get(index)?;
        self.active = index;
        self.on_clicked.as_ref().map(|cb| cb(label.as_str()))
    }
}
