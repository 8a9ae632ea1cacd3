//! Cornerpin engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the warp layer and
//! the studio: window loop, device, input translation, the overlay draw stream.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
