// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image given on the command line could not be opened or decoded.
    #[error("Image load error ({}): {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Creating the window failed.
    #[error("Window init error: {0}")]
    WindowInit(String),
    /// Updating the window buffer failed.
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    /// The augmentation could not produce a frame (bad image shape or parameters).
    #[error("Transform error: {0}")]
    Transform(String),
}
