//! Instructional text derived from the active catalog.

use crate::catalog::{names, Catalog};

/// Render the catalog and the read-back policy into guidance for the
/// model. Pure function of the catalog: same input, same string.
///
/// The read-back section deliberately frames `read_screen` as optional
/// and must never instruct the model to call it unconditionally.
pub fn build_guidance_prompt(catalog: &Catalog) -> String {
    let mut prompt = String::from("# Available tools\n\n");
    for def in catalog.definitions() {
        prompt.push_str(&format!("- `{}`: {}\n", def.name, def.description));
    }

    if catalog.contains(names::EMIT_SCREEN) {
        prompt.push_str(
            "\n`emit_screen` is the canonical output channel: anything the user \
             should see must be emitted through it as a full HTML screen.\n",
        );
    }

    if catalog.contains(names::READ_SCREEN) {
        prompt.push_str(
            "\n`read_screen` is optional and most turns need no read-back at all. \
             When you do need to check the current screen, start with the lightest \
             mode (`meta`) and escalate to `outline` or `snippet` only if the \
             fingerprint is not enough. You get one read per turn, plus one \
             recovery read with recovery=true.\n",
        );
    }

    prompt
}
