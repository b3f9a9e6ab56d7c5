// Owns everything the user can change: the augmentation parameters, the
// widgets that edit them and the run/pause/quit state of the loop.
// Raw pointer/key input comes in, gets hit-tested against the widgets, and
// whatever command a widget callback returns is applied here.

use std::time::Duration;

use crate::config::SimConfig;
use crate::params::{ParamValue, ParameterStore};
use crate::render_loop::{LoopState, RenderState};
use crate::types::SourceImage;
use crate::widgets::{Button, Command, RadioButtons, Slider};

/// Window input, already converted to figure fractions (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    PointerDown { x: f32, y: f32 },
    /// Pointer moved while the button is held.
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Escape.
    QuitKey,
    /// The window was closed.
    Closed,
}

/// Every widget on screen.
pub struct Panel {
    sliders: Vec<Slider>,
    interval: Slider,
    fill_mode: RadioButtons,
    buttons: Vec<Button>,
}

impl Panel {
    /// Build the widgets from the layout and wire their callbacks.
    pub fn new(config: &SimConfig) -> Self {
        let slider = |spec: &crate::config::SliderSpec| {
            let mut s = Slider::new(spec.name, spec.rect, spec.min, spec.max, spec.init);
            s.bind("on_changed".into(), Box::new(|_| Command::SyncSliders));
            s
        };

        let mut fill_mode = RadioButtons::new(config.fill_mode_rect, &config.fill_mode_labels);
        fill_mode.bind("on_clicked".into(), Box::new(|label: &str| Command::SetFillMode(label.to_owned())));

        let button = |label: &str, rect, cmd: fn() -> Command| {
            let mut b = Button::new(label, rect);
            b.bind("on_clicked".into(), Box::new(cmd));
            b
        };

        Self {
            sliders: config.sliders.iter().map(slider).collect(),
            interval: slider(&config.interval_slider),
            fill_mode,
            buttons: vec![
                button("quit", config.quit_rect, || Command::Quit),
                button("start", config.start_rect, || Command::Start),
                button("stop", config.stop_rect, || Command::Stop),
            ],
        }
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn interval(&self) -> &Slider {
        &self.interval
    }

    pub fn fill_mode(&self) -> &RadioButtons {
        &self.fill_mode
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }
}

/// Which slider the pointer is dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grab {
    Param(usize),
    Interval,
}

pub struct Controller {
    params: ParameterStore,
    panel: Panel,
    render: RenderState,
    grab: Option<Grab>,
}

impl Controller {
    pub fn new(config: &SimConfig, first_frame: SourceImage) -> Self {
        let mut ctl = Self {
            params: ParameterStore::new(),
            panel: Panel::new(config),
            render: RenderState::new(first_frame, config.initial_interval()),
            grab: None,
        };
        ctl.sync_sliders();
        ctl
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    #[cfg(test)]
    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn render(&self) -> &RenderState {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderState {
        &mut self.render
    }

    /// Route one input. Returns true when something on screen changed.
    pub fn handle_input(&mut self, input: Input) -> bool {
        match input {
            Input::PointerDown { x, y } => self.press(x, y),
            Input::PointerMove { x, .. } => {
                let cmd = match self.grab {
                    Some(Grab::Param(i)) => self.panel.sliders[i].set_from_pointer(x),
                    Some(Grab::Interval) => self.panel.interval.set_from_pointer(x),
                    None => return false,
                };
                self.apply(cmd)
            }
            Input::PointerUp => {
                self.grab = None;
                false
            }
            Input::QuitKey | Input::Closed => {
                self.dispatch(Command::Quit);
                true
            }
        }
    }

    fn press(&mut self, x: f32, y: f32) -> bool {
        if let Some(i) = self.panel.sliders.iter().position(|s| s.rect().contains(x, y)) {
            self.grab = Some(Grab::Param(i));
            let cmd = self.panel.sliders[i].set_from_pointer(x);
            return self.apply(cmd);
        }
        if self.panel.interval.rect().contains(x, y) {
            self.grab = Some(Grab::Interval);
            let cmd = self.panel.interval.set_from_pointer(x);
            return self.apply(cmd);
        }
        if let Some(row) = self.panel.fill_mode.row_at(y).filter(|_| self.panel.fill_mode.rect().contains(x, y)) {
            let cmd = self.panel.fill_mode.select(row);
            self.apply(cmd);
            return true;
        }
        if let Some(b) = self.panel.buttons.iter().find(|b| b.rect().contains(x, y)) {
            let cmd = b.click();
            return self.apply(cmd);
        }
        false
    }

    fn apply(&mut self, cmd: Option<Command>) -> bool {
        match cmd {
            Some(cmd) => {
                self.dispatch(cmd);
                true
            }
            None => false,
        }
    }

    /// Apply what a widget callback asked for.
    pub fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::SyncSliders => self.sync_sliders(),
            Command::SetFillMode(label) => {
                self.params.set("fill_mode", ParamValue::Label(label));
                tracing::debug!(current = ?self.params.get("fill_mode"), "fill mode");
            }
            Command::Quit => self.switch(LoopState::Stopped, "quit"),
            Command::Start => self.switch(LoopState::Running, "start"),
            Command::Stop => self.switch(LoopState::Paused, "stop"),
        }
    }

    /// Re-read every slider at once, not just the one that moved.
    fn sync_sliders(&mut self) {
        for s in &self.panel.sliders {
            self.params.set(s.name(), ParamValue::Number(s.current_value()));
        }
        let interval = Duration::from_secs_f32(self.panel.interval.current_value());
        self.render.set_tick_interval(interval);
    }

    fn switch(&mut self, next: LoopState, control: &str) {
        let prev = self.render.transition(next);
        tracing::info!(control, from = ?prev, to = ?self.render.state(), "loop state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AugmentParams, FillMode};
    use image::RgbImage;

    fn controller() -> (SimConfig, Controller) {
        let config = SimConfig::default();
        let ctl = Controller::new(&config, SourceImage::Rgb(RgbImage::new(8, 8)));
        (config, ctl)
    }

    fn center(r: crate::widgets::Rect) -> (f32, f32) {
        (r.left + r.width / 2.0, r.bottom + r.height / 2.0)
    }

    #[test]
    fn starts_running_with_defaults() {
        let (config, ctl) = controller();
        assert_eq!(ctl.render().state(), LoopState::Running);
        assert_eq!(ctl.render().tick_interval(), config.initial_interval());
        assert_eq!(ctl.params().snapshot(), AugmentParams::default());
    }

    #[test]
    fn any_slider_change_resyncs_everything() {
        let (config, mut ctl) = controller();
        let (_, y) = center(config.sliders[0].rect);
        let right = config.sliders[0].rect.left + config.sliders[0].rect.width;
        assert!(ctl.handle_input(Input::PointerDown { x: right, y }));
        let rotation = ctl.params().snapshot().rotation;
        assert!((rotation - 180.0).abs() < 1e-3, "{rotation}");

        let (x, y) = center(config.interval_slider.rect);
        assert!(ctl.handle_input(Input::PointerDown { x, y }));
        let secs = ctl.render().tick_interval().as_secs_f32();
        assert!((secs - 0.55).abs() < 1e-3, "{secs}");
        assert_eq!(ctl.params().snapshot().rotation, rotation);
    }

    #[test]
    fn drag_ends_on_release() {
        let (config, mut ctl) = controller();
        let rect = config.sliders[1].rect;
        let (_, y) = center(rect);
        ctl.handle_input(Input::PointerDown { x: rect.left, y });
        ctl.handle_input(Input::PointerMove { x: rect.left + rect.width / 2.0, y: 0.9 });
        let mid = ctl.params().snapshot().width_shift;
        assert!((mid - 0.5).abs() < 1e-3);
        ctl.handle_input(Input::PointerUp);
        assert!(!ctl.handle_input(Input::PointerMove { x: rect.left, y }));
        assert_eq!(ctl.params().snapshot().width_shift, mid);
    }

    #[test]
    fn radio_sets_fill_mode_label() {
        let (config, mut ctl) = controller();
        let r = config.fill_mode_rect;
        let row_h = r.height / 4.0;
        for (i, mode) in FillMode::ALL.iter().enumerate() {
            let y = r.bottom + r.height - row_h * (i as f32 + 0.5);
            assert!(ctl.handle_input(Input::PointerDown { x: r.left + r.width / 2.0, y }));
            assert_eq!(ctl.params().snapshot().fill_mode, *mode);
            assert_eq!(ctl.panel().fill_mode().active(), i);
        }
    }

    #[test]
    fn buttons_drive_the_state_machine() {
        let (config, mut ctl) = controller();
        let press = |ctl: &mut Controller, rect| {
            let (x, y) = center(rect);
            ctl.handle_input(Input::PointerDown { x, y })
        };
        assert!(press(&mut ctl, config.stop_rect));
        assert_eq!(ctl.render().state(), LoopState::Paused);
        assert!(press(&mut ctl, config.start_rect));
        assert_eq!(ctl.render().state(), LoopState::Running);
        assert!(press(&mut ctl, config.quit_rect));
        assert_eq!(ctl.render().state(), LoopState::Stopped);
        // quit is a latch
        press(&mut ctl, config.start_rect);
        assert_eq!(ctl.render().state(), LoopState::Stopped);
    }

    #[test]
    fn escape_and_close_quit() {
        let (_, mut ctl) = controller();
        ctl.dispatch(Command::Stop);
        ctl.handle_input(Input::QuitKey);
        assert_eq!(ctl.render().state(), LoopState::Stopped);

        let (_, mut ctl) = controller();
        ctl.handle_input(Input::Closed);
        assert_eq!(ctl.render().state(), LoopState::Stopped);
    }

    #[test]
    fn click_on_empty_space_does_nothing() {
        let (_, mut ctl) = controller();
        assert!(!ctl.handle_input(Input::PointerDown { x: 0.5, y: 0.7 }));
        assert_eq!(ctl.render().state(), LoopState::Running);
        assert_eq!(ctl.params().snapshot(), AugmentParams::default());
    }

    #[test]
    fn unknown_fill_mode_label_is_dropped() {
        let (_, mut ctl) = controller();
        ctl.dispatch(Command::SetFillMode("wrap".into()));
        ctl.dispatch(Command::SetFillMode("mirror".into()));
        assert_eq!(ctl.params().snapshot().fill_mode, FillMode::Wrap);
    }
}
