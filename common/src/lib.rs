#[macro_use]
extern crate tracing;

use serde::Serialize;

mod deck;
mod error;
mod load;

pub use self::{
    deck::Deck,
    error::{Error, Result},
    load::{from_image, load_memory, load_path},
};

/// A single pixel to be placed on the canvas
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pixel {
    #[serde(rename = "X")]
    pub x: i64,
    #[serde(rename = "Y")]
    pub y: i64,
    /// `RRGGBB`, uppercase
    #[serde(rename = "Color")]
    pub color: String,
}

impl Pixel {
    pub fn new(x: i64, y: i64, [r, g, b]: [u8; 3]) -> Self {
        Self {
            x,
            y,
            color: format!("{r:02X}{g:02X}{b:02X}"),
        }
    }
}
