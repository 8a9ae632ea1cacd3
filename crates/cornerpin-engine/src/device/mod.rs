//! GPU device and window surface.
//!
//! [`Gpu`] opens the adapter, device and queue, keeps the surface configured
//! across resizes, hands out one [`GpuFrame`] per redraw and reopens the
//! device after a loss.

mod context;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use frame::{GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
