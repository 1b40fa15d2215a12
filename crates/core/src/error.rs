use thiserror::Error;

/// Denial and failure classes surfaced by the kernel.
///
/// Every variant renders to a stable, greppable message; the dispatcher
/// converts these into error results, they never cross the dispatch
/// boundary as faults.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool '{0}' is blocked during required onboarding")]
    OnboardingBlocked(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Sandbox violation: {0}")]
    SandboxViolation(String),

    #[error("Secret-shaped content detected in {0}; use save_provider_key to store credentials instead of writing them to disk")]
    SecretContent(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Budget exhausted: {0}")]
    BudgetExhausted(String),

    #[error("Unimplemented action: {0}")]
    Unimplemented(String),

    #[error("Delegated handler failed: {0}")]
    Delegation(String),

    #[error("Execution failed: {0}")]
    Execution(String),
}
