use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::editor::html::escape_text;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub content: Value,
    pub company: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FolderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Document metadata edited outside the body, each saved on its own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaField {
    Company,
    Role,
}

impl MetaField {
    pub fn column(&self) -> &'static str {
        match self {
            MetaField::Company => "company",
            MetaField::Role => "role",
        }
    }
}

/// One entry of a content envelope. The editor only writes `type: "doc"`
/// with `html`; older documents may carry other types with `text` or `html`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Persisted document body: `{ "blocks": [ { "type": "doc", "html": "..." } ] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEnvelope {
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

impl ContentEnvelope {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            blocks: vec![ContentBlock {
                block_type: "doc".to_string(),
                html: Some(html.into()),
                text: None,
            }],
        }
    }

    /// Reads a stored JSON value. Anything unparseable reads as an empty body.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self { blocks: Vec::new() })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Flattens the envelope to a single HTML string. A `doc` block wins
    /// outright; legacy blocks are concatenated in order.
    pub fn to_html(&self) -> String {
        if let Some(doc) = self.blocks.iter().find(|b| b.block_type == "doc") {
            return doc.html.clone().unwrap_or_default();
        }
        self.blocks
            .iter()
            .map(|b| match (&b.html, &b.text) {
                (Some(html), _) => html.clone(),
                (None, Some(text)) => format!("<p>{}</p>", escape_text(text)),
                (None, None) => String::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_envelope_shape() {
        let env = ContentEnvelope::from_html("<p>x</p>");
        assert_eq!(
            env.to_value(),
            json!({ "blocks": [ { "type": "doc", "html": "<p>x</p>" } ] })
        );
    }

    #[test]
    fn test_legacy_blocks_flattened_in_order() {
        let value = json!({
            "blocks": [
                { "type": "heading", "html": "<h1>Title</h1>" },
                { "type": "paragraph", "text": "a < b" },
                { "type": "spacer" }
            ]
        });
        let env = ContentEnvelope::from_value(&value);
        assert_eq!(env.to_html(), "<h1>Title</h1><p>a &lt; b</p>");
    }

    #[test]
    fn test_invalid_content_reads_empty() {
        assert_eq!(ContentEnvelope::from_value(&json!("nope")).to_html(), "");
        assert_eq!(ContentEnvelope::from_value(&Value::Null).to_html(), "");
    }
}
