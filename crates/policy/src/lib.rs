pub mod catalog;
pub mod guidance;
pub mod secrets;

pub use catalog::{Catalog, ToolDefinition};
pub use guidance::build_guidance_prompt;
pub use secrets::looks_like_secret;
