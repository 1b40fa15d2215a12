pub mod read_back;
pub mod render;

pub use read_back::{ReadMode, ReadScreenArgs, ReadScreenUsage};
pub use render::{EmitScreenArgs, RenderEvent, RenderOutputState};
