pub mod config;
pub mod error;
pub mod types;

pub use config::{RuntimeConfig, WorkspacePolicy};
pub use error::ToolError;
pub use types::{CapabilityTier, ToolCallRequest, ToolCallResult};
