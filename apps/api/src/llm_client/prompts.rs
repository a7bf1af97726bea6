// Cross-cutting prompt fragments. Each service that calls the LLM keeps its
// own prompts alongside it and composes these in.

/// System prompt fragment for answers that are inserted straight into a
/// document.
pub const PLAIN_TEXT_SYSTEM: &str = "You are an editor for Korean resumes and cover letters. \
    Respond with the resulting text only. \
    Do NOT add explanations, headings, quotes or markdown. \
    Do NOT wrap the answer in code fences.";

/// Keeps template tokens intact through a rewrite.
pub const PLACEHOLDER_INSTRUCTION: &str = "\
    Text may contain tokens such as {{company}} or {{role}}. \
    Keep every such token exactly as written.";

/// Forbids invented facts in rewrites.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Never add facts, numbers, employers or dates that are not in the input.";
