use neural_desk_screen::{ReadScreenUsage, RenderOutputState};
use uuid::Uuid;

/// Kernel-owned state for one session. Sessions never share instances.
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    pub render: RenderOutputState,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            render: RenderOutputState::new(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Ephemeral per-turn state. Reset by construction at turn start; the
/// read-back quota must not leak into the next turn.
#[derive(Debug, Default)]
pub struct TurnState {
    pub read_usage: ReadScreenUsage,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Onboarding gate flags as supplied by the host for one dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingGate {
    /// Restricts the advertised catalog to the fixed onboarding list.
    pub onboarding_required: bool,
    /// Restricts dispatch: calls outside the onboarding list are denied.
    pub onboarding_mode: bool,
}

impl OnboardingGate {
    pub fn active() -> Self {
        Self {
            onboarding_required: true,
            onboarding_mode: true,
        }
    }

    pub fn lifted() -> Self {
        Self::default()
    }
}
