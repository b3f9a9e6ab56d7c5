// Static knobs for the simulator: window size, tick intervals, widget ranges
// and where each widget sits in the window.
// Rectangles are figure fractions [left, bottom, width, height], origin at
// the bottom-left corner, so the layout scales with the window.

use std::time::Duration;

use crate::params::FillMode;
use crate::widgets::Rect;

/// One slider: the option it drives, its range, its start value and its place.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderSpec {
    pub name: &'static str,
    pub rect: Rect,
    pub min: f32,
    pub max: f32,
    pub init: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub window_width: usize,
    pub window_height: usize,

    /// Paused ticks always redraw at this rate, independent of the interval slider.
    pub paused_interval: Duration,
    /// How often input is pumped while a tick is suspended.
    pub input_slice: Duration,

    pub image_rect: Rect,
    pub fill_mode_rect: Rect,
    pub fill_mode_labels: Vec<&'static str>,

    /// Augmentation sliders, drawn top to bottom.
    pub sliders: Vec<SliderSpec>,
    /// Controls the running tick interval (seconds).
    pub interval_slider: SliderSpec,

    pub quit_rect: Rect,
    pub start_rect: Rect,
    pub stop_rect: Rect,
}

impl Default for SimConfig {
    fn default() -> Self {
        let slider = |name, bottom, max| SliderSpec {
            name,
            rect: Rect::new(0.15, bottom, 0.7, 0.02),
            min: 0.0,
            max,
            init: 0.0,
        };

        Self {
            window_width: 900,
            window_height: 600,
            paused_interval: Duration::from_secs(1),
            input_slice: Duration::from_millis(16),

            image_rect: Rect::new(0.1, 0.4, 0.8, 0.5),
            fill_mode_rect: Rect::new(0.05, 0.4, 0.1, 0.15),
            fill_mode_labels: FillMode::ALL.iter().map(|m| m.label()).collect(),

            sliders: vec![
                slider("rotate", 0.30, 180.0),
                slider("width_shift", 0.27, 1.0),
                slider("height_shift", 0.24, 1.0),
                slider("shear", 0.21, 180.0),
                slider("zoom", 0.18, 1.0),
            ],
            interval_slider: SliderSpec {
                name: "interval",
                rect: Rect::new(0.1, 0.1, 0.8, 0.02),
                min: 0.1,
                max: 1.0,
                init: 0.5,
            },

            quit_rect: Rect::new(0.2, 0.025, 0.1, 0.04),
            start_rect: Rect::new(0.7, 0.025, 0.1, 0.04),
            stop_rect: Rect::new(0.8, 0.025, 0.1, 0.04),
        }
    }
}

impl SimConfig {
    /// Interval the loop starts with, taken from the interval slider.
    pub fn initial_interval(&self) -> Duration {
        Duration::from_secs_f32(self.interval_slider.init)
    }
}
