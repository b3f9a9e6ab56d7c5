// What you SEE:
// • The picture from the command line, re-augmented every tick (rotate/shift/shear/zoom).
// • Sliders under it set the random ranges; the bottom slider sets how fast frames change.
// • Radio buttons on the left pick how uncovered pixels get filled.
// • start/stop pause the preview (last frame stays up), quit or ESC closes.

mod augment;
mod config;
mod controller;
mod draw;
mod error;
mod params;
mod render_loop;
mod types;
mod widgets;

use std::path::PathBuf;

use augment::TransformInvoker;
use clap::Parser;
use config::SimConfig;
use controller::Controller;
use draw::Drawer;
use error::Error;
use render_loop::RenderLoop;
use tracing_subscriber::EnvFilter;
use types::SourceImage;

#[derive(Parser, Debug)]
#[command(author, version, about = "Preview random image augmentations live", long_about = None)]
struct Cli {
    /// Path to the image to augment.
    img_path: PathBuf,
}

fn main() -> Result<(), Error> {
    init_tracing();
    let cli = Cli::parse();

    /* --- Source image ---
       Visual: nothing yet; a bad path stops here with the decoder's message. */
    let source = SourceImage::open(&cli.img_path)?;
    let (w, h) = source.dimensions();
    tracing::info!(path = %cli.img_path.display(), w, h, channels = source.channels(), "loaded image");

    /* --- Window + widgets ---
       Visual: window opens with the original image and the control panel. */
    let config = SimConfig::default();
    let title = cli.img_path.display().to_string();
    let mut drawer = Drawer::new("augment-sim", &title, &config)?;
    let mut controller = Controller::new(&config, source.clone());

    /* ------------------------------ Main loop ------------------------------ */
    let invoker = TransformInvoker::new(rand::thread_rng());
    let mut render = RenderLoop::new(source, invoker, &config);
    render.run(&mut controller, &mut drawer)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
