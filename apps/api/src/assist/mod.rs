//! AI-assisted rewriting of selected text.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{LlmClient, LlmError};

/// The message shown to users for any AI failure.
pub const AI_FAILED_MESSAGE: &str = "AI 처리 중 오류가 발생했습니다.";
pub const MAX_INPUT_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteOp {
    Proofread,
    RewriteTone,
    Summarize,
    Keywords,
    TranslateEn,
    TranslateKo,
}

impl RewriteOp {
    pub const ALL: [RewriteOp; 6] = [
        RewriteOp::Proofread,
        RewriteOp::RewriteTone,
        RewriteOp::Summarize,
        RewriteOp::Keywords,
        RewriteOp::TranslateEn,
        RewriteOp::TranslateKo,
    ];
}

#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, op: RewriteOp, text: &str) -> Result<String, LlmError>;
}

pub struct LlmRewriter {
    llm: LlmClient,
}

impl LlmRewriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Rewriter for LlmRewriter {
    async fn rewrite(&self, op: RewriteOp, text: &str) -> Result<String, LlmError> {
        let prompt = prompts::build_prompt(op, text);
        match self.llm.call_text(&prompt, prompts::system_prompt()).await {
            Ok(out) => {
                info!("Rewrite {:?} produced {} chars", op, out.chars().count());
                Ok(out)
            }
            Err(e) => {
                warn!("Rewrite {:?} failed: {e}", op);
                Err(e)
            }
        }
    }
}
