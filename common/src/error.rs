use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image could not be decoded")]
    Decode(#[from] image::ImageError),

    #[error("offset ({x}, {y}) pushes the image off the canvas")]
    OffsetOutOfRange { x: i64, y: i64 },

    #[error("no pixels to deal, the image has no visible pixels")]
    EmptyDeck,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
