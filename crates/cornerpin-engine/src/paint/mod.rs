//! Colors for the overlay and the clear pass.

mod color;

pub use color::Color;
