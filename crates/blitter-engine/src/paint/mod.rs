//! Color values used for clears and letterbox borders.

mod color;

pub use color::Color;
