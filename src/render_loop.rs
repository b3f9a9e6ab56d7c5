// The preview loop. One tick = (maybe) compute a frame, show a frame, then
// suspend. Suspending is where window input gets pumped and routed to the
// controller, so a click lands at the next suspension slice, never mid-tick.
//
//   RUNNING : augment the source, keep it as the last frame, show it,
//             suspend for the interval slider's value
//   PAUSED  : show the last frame again, suspend a fixed second
//   STOPPED : leave the loop, nothing drawn

use std::time::Duration;

use rand::Rng;

use crate::augment::TransformInvoker;
use crate::config::SimConfig;
use crate::controller::{Controller, Input, Panel};
use crate::error::Error;
use crate::types::SourceImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    /// Terminal; nothing leaves this state.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RenderState {
    state: LoopState,
    tick_interval: Duration,
    last_rendered: SourceImage,
}

impl RenderState {
    /// Starts running, with the source itself as the "last" frame.
    pub fn new(first_frame: SourceImage, tick_interval: Duration) -> Self {
        Self { state: LoopState::Running, tick_interval, last_rendered: first_frame }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    pub fn last_rendered(&self) -> &SourceImage {
        &self.last_rendered
    }

    pub fn set_last_rendered(&mut self, frame: SourceImage) {
        self.last_rendered = frame;
    }

    /// Move to `next` unless already stopped. Returns the previous state.
    pub fn transition(&mut self, next: LoopState) -> LoopState {
        let prev = self.state;
        if prev != LoopState::Stopped {
            self.state = next;
        }
        prev
    }
}

/// Where frames go and where input comes from.
pub trait Surface {
    /// Show `frame` with the control panel drawn around it.
    fn present(&mut self, frame: &SourceImage, panel: &Panel) -> Result<(), Error>;

    /// Block for `budget`, then hand back whatever input arrived meanwhile.
    fn wait_events(&mut self, budget: Duration) -> Result<Vec<Input>, Error>;
}

pub struct RenderLoop<R> {
    source: SourceImage,
    invoker: TransformInvoker<R>,
    paused_interval: Duration,
    input_slice: Duration,
    ticks: u64,
}

impl<R: Rng> RenderLoop<R> {
    pub fn new(source: SourceImage, invoker: TransformInvoker<R>, config: &SimConfig) -> Self {
        Self {
            source,
            invoker,
            paused_interval: config.paused_interval,
            input_slice: config.input_slice.max(Duration::from_millis(1)),
            ticks: 0,
        }
    }

    /// Completed ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick until the controller reaches `Stopped`. A transform or window
    /// failure ends the loop with that error.
    pub fn run<S: Surface>(&mut self, ctl: &mut Controller, surface: &mut S) -> Result<(), Error> {
        tracing::info!(interval = ?ctl.render().tick_interval(), "render loop started");
        while self.tick(ctl, surface)? {}
        tracing::info!(ticks = self.ticks, "render loop finished");
        Ok(())
    }

    /// One iteration. Returns false once stopped (nothing was drawn).
    pub fn tick<S: Surface>(&mut self, ctl: &mut Controller, surface: &mut S) -> Result<bool, Error> {
        let interval = match ctl.render().state() {
            LoopState::Stopped => return Ok(false),
            LoopState::Running => {
                let snapshot = ctl.params().snapshot();
                let frame = self.invoker.invoke(&self.source, &snapshot)?;
                ctl.render_mut().set_last_rendered(frame);
                ctl.render().tick_interval()
            }
            LoopState::Paused => self.paused_interval,
        };

        surface.present(ctl.render().last_rendered(), ctl.panel())?;
        self.suspend(ctl, surface, interval)?;
        self.ticks += 1;
        tracing::trace!(ticks = self.ticks, ?interval, "tick done");
        Ok(true)
    }

    /// Sleep `interval` in short slices, routing input as it comes in and
    /// redrawing the panel when a widget changed. Bails early on quit.
    fn suspend<S: Surface>(&mut self, ctl: &mut Controller, surface: &mut S, interval: Duration) -> Result<(), Error> {
        let mut remaining = interval;
        while !remaining.is_zero() {
            let slice = remaining.min(self.input_slice);
            let inputs = surface.wait_events(slice)?;
            remaining -= slice;

            let mut dirty = false;
            for input in inputs {
                dirty |= ctl.handle_input(input);
            }
            if ctl.render().state() == LoopState::Stopped {
                break;
            }
            if dirty {
                surface.present(ctl.render().last_rendered(), ctl.panel())?;
            }
        }
        Ok(())
    }
}
