// Prompt templates for the AI rewrite operations.
// Composes the shared fragments from llm_client::prompts.

use crate::assist::RewriteOp;
use crate::llm_client::prompts::{NO_INVENTION_INSTRUCTION, PLACEHOLDER_INSTRUCTION, PLAIN_TEXT_SYSTEM};

/// Rewrite prompt template. Replace `{instruction}`, `{rules}` and `{text}`.
const REWRITE_PROMPT_TEMPLATE: &str = r#"{instruction}

Rules:
{rules}

TEXT:
{text}"#;

pub fn system_prompt() -> &'static str {
    PLAIN_TEXT_SYSTEM
}

fn instruction(op: RewriteOp) -> &'static str {
    match op {
        RewriteOp::Proofread => {
            "Fix spelling, spacing and grammar in the following Korean text. \
             Keep the wording and tone otherwise unchanged."
        }
        RewriteOp::RewriteTone => {
            "Rewrite the following text in a confident, professional tone suitable for a \
             resume or cover letter. Prefer concrete verbs and keep it concise."
        }
        RewriteOp::Summarize => {
            "Summarize the following text in at most three sentences, keeping the most \
             important achievements and numbers."
        }
        RewriteOp::Keywords => {
            "List the key skills and keywords in the following text as a single \
             comma-separated line."
        }
        RewriteOp::TranslateEn => "Translate the following text into natural, professional English.",
        RewriteOp::TranslateKo => "Translate the following text into natural, professional Korean.",
    }
}

pub fn build_prompt(op: RewriteOp, text: &str) -> String {
    let rules = [PLACEHOLDER_INSTRUCTION, NO_INVENTION_INSTRUCTION]
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n");
    REWRITE_PROMPT_TEMPLATE
        .replace("{instruction}", instruction(op))
        .replace("{rules}", &rules)
        .replace("{text}", text.trim())
}
