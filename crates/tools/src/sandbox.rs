use neural_desk_core::{ToolError, WorkspacePolicy};
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Validates filesystem paths against the workspace root set. Stateless
/// after construction; safe to share across sessions.
pub struct WorkspaceGuard {
    default_root: PathBuf,
    allowed_roots: Vec<PathBuf>,
}

impl WorkspaceGuard {
    pub fn new(policy: &WorkspacePolicy) -> Result<Self, ToolError> {
        let default_root = canonical_root(&policy.default_root)?;
        let mut allowed_roots = vec![default_root.clone()];
        for root in &policy.allowed_roots {
            let root = canonical_root(root)?;
            if !allowed_roots.contains(&root) {
                allowed_roots.push(root);
            }
        }
        Ok(Self {
            default_root,
            allowed_roots,
        })
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }

    /// Resolve a requested path to an absolute location inside the
    /// allowed roots. Relative paths anchor at the default root. A
    /// denial is terminal for the call; nothing here retries or touches
    /// storage.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ToolError> {
        let requested_path = Path::new(requested);
        let joined = if requested_path.is_absolute() {
            requested_path.to_path_buf()
        } else {
            self.default_root.join(requested_path)
        };

        let normalized = lexical_normalize(&joined).ok_or_else(|| {
            ToolError::SandboxViolation(format!("path {requested} escapes the workspace"))
        })?;

        // resolve symlinks in whatever part of the path already exists,
        // so a link inside the root cannot point outside it
        let resolved = canonicalize_existing_prefix(&normalized);

        if !self
            .allowed_roots
            .iter()
            .any(|root| resolved.starts_with(root))
        {
            return Err(ToolError::SandboxViolation(format!(
                "path {requested} escapes the workspace"
            )));
        }

        Ok(resolved)
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf, ToolError> {
    fs::canonicalize(root).map_err(|e| {
        ToolError::SandboxViolation(format!("invalid workspace root {}: {e}", root.display()))
    })
}

/// Resolve `.` and `..` without touching the filesystem. Returns `None`
/// when `..` climbs past the filesystem root.
fn lexical_normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    Some(normalized)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append
/// the not-yet-existing tail, so new files get symlink-checked parents.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();
    loop {
        match fs::canonicalize(&existing) {
            Ok(canonical) => {
                let mut resolved = canonical;
                for part in tail.iter().rev() {
                    resolved.push(part);
                }
                return resolved;
            }
            Err(_) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                _ => return path.to_path_buf(),
            },
        }
    }
}
