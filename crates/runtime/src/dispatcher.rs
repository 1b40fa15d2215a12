//! The dispatch kernel: validates, authorizes, and executes every
//! model-issued tool call.

use neural_desk_core::{RuntimeConfig, ToolCallRequest, ToolCallResult, ToolError};
use neural_desk_policy::catalog::{names, Catalog};
use neural_desk_policy::secrets;
use neural_desk_screen::{read_back, render, RenderEvent};
use neural_desk_tools::{file_tools, shell, WorkspaceGuard};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::HandlerTable;
use crate::session::{OnboardingGate, SessionState, TurnState};

/// Actions always executed through the host's handler table. Their
/// effects (credential store, onboarding checkpoints, memory, web)
/// belong to the host, not the kernel.
const DELEGATED_ACTIONS: &[&str] = &[
    names::SAVE_PROVIDER_KEY,
    names::GET_ONBOARDING_STATE,
    names::SET_WORKSPACE_ROOT,
    names::SET_MODEL_PREFERENCES,
    names::COMPLETE_ONBOARDING,
    names::MEMORY_APPEND,
    names::MEMORY_SEARCH,
    names::MEMORY_GET,
    names::WEB_SEARCH,
];

pub struct ToolDispatcher {
    config: RuntimeConfig,
    workspace: WorkspaceGuard,
    events: broadcast::Sender<RenderEvent>,
}

impl ToolDispatcher {
    pub fn new(config: RuntimeConfig) -> Result<Self, ToolError> {
        let workspace = WorkspaceGuard::new(&config.workspace)?;
        let (events, _) = broadcast::channel(32);
        Ok(Self {
            config,
            workspace,
            events,
        })
    }

    /// Observers of `render_output` events. Delivery is best-effort;
    /// the kernel keeps no event history.
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.events.subscribe()
    }

    pub fn workspace(&self) -> &WorkspaceGuard {
        &self.workspace
    }

    /// Run one tool call to completion. Every denial and failure comes
    /// back as an error result; nothing here faults the process.
    pub async fn execute(
        &self,
        call: &ToolCallRequest,
        session: &mut SessionState,
        turn: &mut TurnState,
        gate: &OnboardingGate,
        handlers: &HandlerTable,
    ) -> ToolCallResult {
        let audit_ref = Uuid::new_v4();
        debug!(tool = %call.name, session = %session.session_id, %audit_ref, "dispatching tool call");

        match self.execute_inner(call, session, turn, gate, handlers).await {
            Ok(result) => result,
            Err(err) => {
                warn!(tool = %call.name, %audit_ref, error = %err, "tool call denied");
                ToolCallResult::from(err)
            }
        }
    }

    async fn execute_inner(
        &self,
        call: &ToolCallRequest,
        session: &mut SessionState,
        turn: &mut TurnState,
        gate: &OnboardingGate,
        handlers: &HandlerTable,
    ) -> Result<ToolCallResult, ToolError> {
        // 1. catalog membership; the onboarding gate overrides the tier
        let catalog = Catalog::build(self.config.capability_tier, gate.onboarding_mode);
        if !catalog.contains(&call.name) {
            if gate.onboarding_mode {
                return Err(ToolError::OnboardingBlocked(call.name.clone()));
            }
            return Err(ToolError::UnknownTool(call.name.clone()));
        }

        // 2. host-owned actions go through the handler table
        if DELEGATED_ACTIONS.contains(&call.name.as_str()) {
            let handler = handlers.get(&call.name).ok_or_else(|| {
                ToolError::Unimplemented(format!("no handler registered for '{}'", call.name))
            })?;
            return match handler.call(call.arguments.clone()).await {
                Ok(payload) => Ok(ToolCallResult::ok(payload.to_string())),
                Err(reason) => Err(ToolError::Delegation(reason)),
            };
        }

        // 3. screen protocol
        if call.name == names::EMIT_SCREEN {
            let args = render::validate_emit_screen_args(&call.arguments)?;
            let event = render::apply(&mut session.render, args, &call.id);
            info!(revision = event.revision, is_final = event.is_final, "screen emitted");
            let _ = self.events.send(event.clone());
            return Ok(ToolCallResult::ok(
                json!({ "revision": event.revision, "is_final": event.is_final }).to_string(),
            ));
        }
        if call.name == names::READ_SCREEN {
            let args =
                read_back::validate_read_screen_args(&call.arguments, self.config.snippet_max_chars)?;
            let payload = read_back::run_read_screen(args, &session.render, &mut turn.read_usage)?;
            return Ok(ToolCallResult::ok(payload));
        }

        // 4. generic file and shell actions inside the sandbox
        let payload = match call.name.as_str() {
            names::READ_FILE => file_tools::read_file(&self.workspace, &call.arguments).await?,
            names::WRITE_FILE => {
                self.deny_secret_content(call, "content")?;
                file_tools::write_file(&self.workspace, &call.arguments).await?
            }
            names::EDIT_FILE => {
                self.deny_secret_content(call, "new_text")?;
                file_tools::edit_file(&self.workspace, &call.arguments).await?
            }
            names::LIST_FILES => file_tools::list_files(&self.workspace, &call.arguments).await?,
            names::SEARCH_FILES => {
                file_tools::search_files(&self.workspace, &call.arguments).await?
            }
            names::RUN_SHELL => {
                self.deny_secret_content(call, "command")?;
                shell::run_shell(&self.workspace, &call.arguments).await?
            }
            other => {
                return Err(ToolError::Unimplemented(format!(
                    "no executor for '{other}'"
                )))
            }
        };

        Ok(ToolCallResult::ok(payload.to_string()))
    }

    fn deny_secret_content(&self, call: &ToolCallRequest, field: &str) -> Result<(), ToolError> {
        if let Some(content) = call.arguments.get(field).and_then(Value::as_str) {
            if secrets::looks_like_secret(content) {
                return Err(ToolError::SecretContent(format!(
                    "{} {field}",
                    call.name
                )));
            }
        }
        Ok(())
    }
}
