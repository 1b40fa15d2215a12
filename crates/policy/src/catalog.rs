use neural_desk_core::CapabilityTier;
use serde_json::json;

/// Tool name constants shared between the catalog and the dispatcher.
pub mod names {
    pub const EMIT_SCREEN: &str = "emit_screen";
    pub const READ_SCREEN: &str = "read_screen";
    pub const READ_FILE: &str = "read_file";
    pub const WRITE_FILE: &str = "write_file";
    pub const EDIT_FILE: &str = "edit_file";
    pub const LIST_FILES: &str = "list_files";
    pub const SEARCH_FILES: &str = "search_files";
    pub const RUN_SHELL: &str = "run_shell";
    pub const MEMORY_SEARCH: &str = "memory_search";
    pub const MEMORY_GET: &str = "memory_get";
    pub const MEMORY_APPEND: &str = "memory_append";
    pub const WEB_SEARCH: &str = "web_search";
    pub const SAVE_PROVIDER_KEY: &str = "save_provider_key";
    pub const SET_MODEL_PREFERENCES: &str = "set_model_preferences";
    pub const SET_WORKSPACE_ROOT: &str = "set_workspace_root";
    pub const GET_ONBOARDING_STATE: &str = "get_onboarding_state";
    pub const COMPLETE_ONBOARDING: &str = "complete_onboarding";
}

use names::*;

/// Fixed allowlist active while onboarding is required. Order is part of
/// the contract: the prompt layer derives text from it.
const ONBOARDING_TOOLS: &[&str] = &[
    EMIT_SCREEN,
    GET_ONBOARDING_STATE,
    SET_WORKSPACE_ROOT,
    SAVE_PROVIDER_KEY,
    SET_MODEL_PREFERENCES,
    MEMORY_APPEND,
    COMPLETE_ONBOARDING,
];

const TIER_NONE_TOOLS: &[&str] = &[
    EMIT_SCREEN,
    READ_SCREEN,
    READ_FILE,
    LIST_FILES,
    SEARCH_FILES,
    MEMORY_SEARCH,
    MEMORY_GET,
];

const TIER_STANDARD_TOOLS: &[&str] = &[
    EMIT_SCREEN,
    READ_SCREEN,
    READ_FILE,
    WRITE_FILE,
    EDIT_FILE,
    LIST_FILES,
    SEARCH_FILES,
    RUN_SHELL,
    MEMORY_SEARCH,
    MEMORY_GET,
    MEMORY_APPEND,
    SAVE_PROVIDER_KEY,
    SET_MODEL_PREFERENCES,
];

const TIER_EXPERIMENTAL_TOOLS: &[&str] = &[
    EMIT_SCREEN,
    READ_SCREEN,
    READ_FILE,
    WRITE_FILE,
    EDIT_FILE,
    LIST_FILES,
    SEARCH_FILES,
    RUN_SHELL,
    MEMORY_SEARCH,
    MEMORY_GET,
    MEMORY_APPEND,
    WEB_SEARCH,
    SAVE_PROVIDER_KEY,
    SET_MODEL_PREFERENCES,
    SET_WORKSPACE_ROOT,
];

#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: serde_json::Value,
}

/// The set of tools advertised to the model for one session state.
///
/// `Restricted` ignores the capability tier entirely; it is selected per
/// dispatch from the onboarding gate flag, never toggled in place.
#[derive(Debug, Clone)]
pub enum Catalog {
    Restricted(Vec<ToolDefinition>),
    Tiered(CapabilityTier, Vec<ToolDefinition>),
}

impl Catalog {
    pub fn build(tier: CapabilityTier, onboarding_required: bool) -> Self {
        if onboarding_required {
            return Catalog::Restricted(define_all(ONBOARDING_TOOLS));
        }
        let tools = match tier {
            CapabilityTier::None => TIER_NONE_TOOLS,
            CapabilityTier::Standard => TIER_STANDARD_TOOLS,
            CapabilityTier::Experimental => TIER_EXPERIMENTAL_TOOLS,
        };
        Catalog::Tiered(tier, define_all(tools))
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        match self {
            Catalog::Restricted(tools) => tools,
            Catalog::Tiered(_, tools) => tools,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions().iter().any(|def| def.name == name)
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.definitions().iter().map(|def| def.name).collect()
    }

    /// Tool schemas in provider function format.
    pub fn schemas(&self) -> Vec<serde_json::Value> {
        self.definitions()
            .iter()
            .map(|def| {
                json!({
                    "type": "function",
                    "function": {
                        "name": def.name,
                        "description": def.description,
                        "parameters": def.schema
                    }
                })
            })
            .collect()
    }
}

fn define_all(tool_names: &[&'static str]) -> Vec<ToolDefinition> {
    tool_names.iter().map(|&name| define(name)).collect()
}

fn define(name: &'static str) -> ToolDefinition {
    match name {
        EMIT_SCREEN => ToolDefinition {
            name,
            description: "Render the current screen. Replaces whatever the user is looking at.",
            schema: json!({
                "type": "object",
                "properties": {
                    "html": {"type": "string", "description": "Full HTML document for the screen"},
                    "is_final": {"type": "boolean", "description": "Whether this is the last screen of the turn"}
                },
                "required": ["html"]
            }),
        },
        READ_SCREEN => ToolDefinition {
            name,
            description: "Read back the screen you last emitted. Budgeted: one read per turn plus one recovery read.",
            schema: json!({
                "type": "object",
                "properties": {
                    "mode": {"type": "string", "enum": ["meta", "outline", "snippet"], "description": "Payload shape, lightest first"},
                    "max_chars": {"type": "integer", "description": "Snippet length cap"},
                    "recovery": {"type": "boolean", "description": "Required for a second read in the same turn"}
                }
            }),
        },
        READ_FILE => ToolDefinition {
            name,
            description: "Read a file from the workspace",
            schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path relative to the workspace root"}
                },
                "required": ["path"]
            }),
        },
        WRITE_FILE => ToolDefinition {
            name,
            description: "Write content to a file in the workspace",
            schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path relative to the workspace root"},
                    "content": {"type": "string", "description": "Content to write"}
                },
                "required": ["path", "content"]
            }),
        },
        EDIT_FILE => ToolDefinition {
            name,
            description: "Replace one occurrence of old_text with new_text in a workspace file",
            schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "old_text": {"type": "string", "description": "Exact text to replace; must occur exactly once"},
                    "new_text": {"type": "string"}
                },
                "required": ["path", "old_text", "new_text"]
            }),
        },
        LIST_FILES => ToolDefinition {
            name,
            description: "List entries of a workspace directory",
            schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory relative to the workspace root", "default": "."}
                }
            }),
        },
        SEARCH_FILES => ToolDefinition {
            name,
            description: "Search workspace files for a substring",
            schema: json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string"},
                    "path": {"type": "string", "default": "."}
                },
                "required": ["pattern"]
            }),
        },
        RUN_SHELL => ToolDefinition {
            name,
            description: "Run an allowlisted command in the workspace root",
            schema: json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "Command line; no shell metacharacters"}
                },
                "required": ["command"]
            }),
        },
        MEMORY_SEARCH => ToolDefinition {
            name,
            description: "Search durable memory",
            schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"}
                },
                "required": ["query"]
            }),
        },
        MEMORY_GET => ToolDefinition {
            name,
            description: "Fetch one memory entry by id",
            schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"}
                },
                "required": ["id"]
            }),
        },
        MEMORY_APPEND => ToolDefinition {
            name,
            description: "Append an entry to durable memory",
            schema: json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"}
                },
                "required": ["content"]
            }),
        },
        WEB_SEARCH => ToolDefinition {
            name,
            description: "Search the web",
            schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"}
                },
                "required": ["query"]
            }),
        },
        SAVE_PROVIDER_KEY => ToolDefinition {
            name,
            description: "Store a provider API key in the credential store. The only sanctioned path for credentials.",
            schema: json!({
                "type": "object",
                "properties": {
                    "provider": {"type": "string"},
                    "key": {"type": "string"}
                },
                "required": ["provider", "key"]
            }),
        },
        SET_MODEL_PREFERENCES => ToolDefinition {
            name,
            description: "Set the preferred provider and model",
            schema: json!({
                "type": "object",
                "properties": {
                    "provider": {"type": "string"},
                    "model": {"type": "string"}
                },
                "required": ["model"]
            }),
        },
        SET_WORKSPACE_ROOT => ToolDefinition {
            name,
            description: "Change the workspace root directory",
            schema: json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"}
                },
                "required": ["path"]
            }),
        },
        GET_ONBOARDING_STATE => ToolDefinition {
            name,
            description: "Read the current onboarding checkpoint",
            schema: json!({"type": "object", "properties": {}}),
        },
        COMPLETE_ONBOARDING => ToolDefinition {
            name,
            description: "Mark onboarding as finished and unlock the full catalog",
            schema: json!({"type": "object", "properties": {}}),
        },
        other => unreachable!("not a catalog tool: {other}"),
    }
}
