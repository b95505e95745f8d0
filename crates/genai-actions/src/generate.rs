//! The `GENERATE` action.

use std::ops::Deref;

use genai_common::Result;
use genai_content::{Content, Role};

use crate::action::Action;

pub const GENERATE: &str = "GENERATE";

/// Generate a `response` from a `prompt` on `target_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Generate(Action);

impl Generate {
    pub fn new(prompt: impl Into<Content>, target_id: impl Into<String>) -> Self {
        Self(Action::new(
            GENERATE,
            target_id,
            vec![("prompt", prompt.into())],
            vec!["response".to_string()],
        ))
    }

    pub fn into_action(self) -> Action {
        self.0
    }
}

impl Deref for Generate {
    type Target = Action;

    fn deref(&self) -> &Action {
        &self.0
    }
}

impl From<Generate> for Action {
    fn from(generate: Generate) -> Self {
        generate.0
    }
}

/// Text-only content as `ROLE: text` lines, merging consecutive chunks of
/// the same role. A chunk without a role continues the previous one; the
/// first role defaults to `USER`. For debugging only.
pub fn debug_format_text(content: &Content) -> Result<String> {
    let mut lines = Vec::new();
    let mut last_role = Role::User.as_str().to_string();
    let mut rolling = String::new();

    for chunk in content {
        let role = chunk.role();
        if role.is_empty() || role == last_role {
            rolling.push_str(&chunk.as_text(true)?);
        } else {
            if !rolling.is_empty() {
                lines.push(format!("{last_role}: {rolling}"));
            }
            rolling = chunk.as_text(true)?;
            last_role = role.to_string();
        }
    }
    if !rolling.is_empty() {
        lines.push(format!("{last_role}: {rolling}"));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_content::{assistant_chunk, system_chunk, user_chunk, Chunk};

    #[test]
    fn generate_shape() {
        let generate = Generate::new("Tell me a joke", "gemini-pro");
        assert_eq!(generate.name(), GENERATE);
        assert_eq!(generate.target_id(), "gemini-pro");
        assert_eq!(generate.inputs()[0].0, "prompt");
        assert_eq!(generate.inputs()[0].1.as_text(true).unwrap(), "Tell me a joke");
        assert_eq!(generate.output_names(), ["response".to_string()]);
    }

    #[test]
    fn debug_format_groups_by_role() {
        let content = Content::from_chunks([
            Chunk::text("Hi. "),
            user_chunk("How are you?"),
            assistant_chunk("Fine, "),
            Chunk::text("thanks."),
            system_chunk("Be brief."),
        ]);
        assert_eq!(
            debug_format_text(&content).unwrap(),
            "USER: Hi. How are you?\nASSISTANT: Fine, thanks.\nSYSTEM: Be brief."
        );
    }

    #[test]
    fn debug_format_empty_content() {
        assert_eq!(debug_format_text(&Content::new()).unwrap(), "");
    }
}
