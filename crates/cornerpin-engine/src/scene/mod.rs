//! Editor overlay commands (corner handles and quad outline), recorded per
//! frame and painted by z-index, then by push order.

mod cmd;
mod key;
mod list;

pub mod shapes;

pub use cmd::DrawCmd;
pub use key::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
