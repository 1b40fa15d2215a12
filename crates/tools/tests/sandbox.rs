use neural_desk_core::{ToolError, WorkspacePolicy};
use neural_desk_tools::WorkspaceGuard;
use std::fs;

fn guard_for(dir: &tempfile::TempDir) -> WorkspaceGuard {
    WorkspaceGuard::new(&WorkspacePolicy::single_root(dir.path())).unwrap()
}

#[test]
fn relative_path_resolves_under_default_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "content").unwrap();

    let guard = guard_for(&dir);
    let resolved = guard.resolve("notes.txt").unwrap();
    assert!(resolved.starts_with(guard.default_root()));
    assert!(resolved.ends_with("notes.txt"));
}

#[test]
fn new_file_path_resolves_before_it_exists() {
    let dir = tempfile::tempdir().unwrap();
    let guard = guard_for(&dir);
    let resolved = guard.resolve("sub/dir/new.txt").unwrap();
    assert!(resolved.starts_with(guard.default_root()));
}

#[test]
fn dotdot_traversal_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let guard = guard_for(&dir);
    let err = guard.resolve("../../../etc/passwd").unwrap_err();
    assert!(matches!(err, ToolError::SandboxViolation(_)));
    assert!(err.to_string().contains("escapes the workspace"));
}

#[test]
fn interior_dotdot_that_stays_inside_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("top.txt"), "x").unwrap();

    let guard = guard_for(&dir);
    let resolved = guard.resolve("sub/../top.txt").unwrap();
    assert!(resolved.ends_with("top.txt"));
}

#[test]
fn absolute_path_outside_roots_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let guard = guard_for(&dir);
    assert!(guard.resolve("/etc/passwd").is_err());
}

#[test]
fn absolute_path_inside_root_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inside.txt"), "x").unwrap();

    let guard = guard_for(&dir);
    let absolute = dir.path().join("inside.txt");
    assert!(guard.resolve(&absolute.to_string_lossy()).is_ok());
}

#[test]
fn secondary_allowed_root_is_reachable() {
    let primary = tempfile::tempdir().unwrap();
    let secondary = tempfile::tempdir().unwrap();
    fs::write(secondary.path().join("shared.txt"), "x").unwrap();

    let guard = WorkspaceGuard::new(&WorkspacePolicy {
        default_root: primary.path().to_path_buf(),
        allowed_roots: vec![secondary.path().to_path_buf()],
    })
    .unwrap();

    let absolute = secondary.path().join("shared.txt");
    assert!(guard.resolve(&absolute.to_string_lossy()).is_ok());
}

#[cfg(unix)]
#[test]
fn symlink_escaping_the_roots_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("target.txt"), "x").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    let guard = guard_for(&dir);
    let err = guard.resolve("link/target.txt").unwrap_err();
    assert!(matches!(err, ToolError::SandboxViolation(_)));
}

#[test]
fn invalid_root_is_rejected_at_construction() {
    let result = WorkspaceGuard::new(&WorkspacePolicy::single_root("/does/not/exist/anywhere"));
    assert!(matches!(result, Err(ToolError::SandboxViolation(_))));
}
