//! Window input, independent of the windowing backend.
//!
//! The runtime turns platform events into [`InputEvent`]s, folds them into an
//! [`InputState`] and hands the frame's batch to the app as an [`InputFrame`].

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, MouseWheelDelta};
