pub mod editor;
pub mod guard;
pub mod names;
pub mod sharing;

pub use editor::*;
pub use names::*;
pub use sharing::*;
