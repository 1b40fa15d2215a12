//! The seam between the kernel and host-owned effects.
//!
//! Credential storage, onboarding checkpoints, memory, and web search
//! all live outside the kernel; the host registers one handler per
//! action at session start and the dispatcher invokes them opaquely.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One host-owned action. A rejection's reason string is forwarded to
/// the model verbatim, wrapped as an error result.
#[async_trait]
pub trait DelegatedHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> Result<Value, String>;
}

/// Action name to handler. Supplied per session; the kernel never
/// persists it.
pub type HandlerTable = HashMap<String, Arc<dyn DelegatedHandler>>;
