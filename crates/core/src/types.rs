use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Named bucket controlling which generic tools are reachable outside
/// onboarding gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    None,
    Standard,
    Experimental,
}

/// One model-issued tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of a dispatched tool call, returned to the model as result
/// content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub is_error: bool,
    pub text: String,
}

impl ToolCallResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    pub fn denied(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }
}

impl From<ToolError> for ToolCallResult {
    fn from(err: ToolError) -> Self {
        Self::denied(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CapabilityTier::Experimental).unwrap(),
            "\"experimental\""
        );
        let tier: CapabilityTier = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(tier, CapabilityTier::None);
    }

    #[test]
    fn error_converts_to_denied_result() {
        let result = ToolCallResult::from(ToolError::OnboardingBlocked("run_shell".into()));
        assert!(result.is_error);
        assert!(result.text.contains("blocked during required onboarding"));
    }
}
