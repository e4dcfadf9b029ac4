//! Prompt Rendering
//!
//! Turns a [`PromptContext`] into the two messages that open every turn. Both
//! renderers are pure: identical input always yields byte-identical output.

use crate::game_types::{Message, PromptContext};
use std::fmt::Write;

const SYSTEM_TEMPLATE: &str = include_str!("../prompts/system_prompt.md");
const USER_DIRECTIVES: &str = include_str!("../prompts/user_directives.md");

/// Placeholder used when no question has been asked yet.
pub const EMPTY_HISTORY: &str = "(no questions asked yet)";

/// Renders the fixed game rules for `domain`.
pub fn build_system_prompt(domain: &str) -> String {
    SYSTEM_TEMPLATE.replace("{domain}", domain)
}

/// Renders the facts gathered so far plus the per-turn directives.
pub fn build_user_prompt(context: &PromptContext) -> String {
    let mut prompt = String::from("Facts so far:\n");
    if context.history.is_empty() {
        prompt.push_str(EMPTY_HISTORY);
        prompt.push('\n');
    } else {
        for (i, entry) in context.history.iter().enumerate() {
            // Writing into a String cannot fail.
            let _ = writeln!(prompt, "Q{}: {} → {}", i + 1, entry.q, entry.a);
        }
    }

    prompt.push('\n');
    prompt.push_str(USER_DIRECTIVES);
    prompt.push('\n');
    let _ = writeln!(prompt, "FORCE_FINAL: {}", context.force_final);
    if context.force_final {
        prompt.push_str("You must answer with a \"final\" object this turn.\n");
    }

    let hint = context.hint.trim();
    if !hint.is_empty() {
        let _ = writeln!(prompt, "Player hint: {}", hint);
    }

    prompt.push_str("Return strict JSON only.");
    prompt
}

/// Builds the opening `[system, user]` message pair for a turn.
pub fn build_messages(context: &PromptContext) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt(&context.domain)),
        Message::user(build_user_prompt(context)),
    ]
}
