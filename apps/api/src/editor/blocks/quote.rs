use crate::editor::blocks::{field, fill_blank, read_text, shell, BlockKind};
use crate::editor::html::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteFields {
    pub text: String,
    pub author: String,
}

impl Default for QuoteFields {
    fn default() -> Self {
        Self {
            text: "함께 일한 동료의 추천사나 좌우명을 적어보세요".to_string(),
            author: "— 출처".to_string(),
        }
    }
}

impl QuoteFields {
    pub fn read(el: &Element) -> Self {
        let d = Self::default();
        Self {
            text: read_text(el, "text", &d.text),
            author: read_text(el, "author", &d.author),
        }
    }

    pub fn normalize(&mut self) {
        let d = Self::default();
        fill_blank(&mut self.text, &d.text);
        fill_blank(&mut self.author, &d.author);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "text" => Some(&mut self.text),
            "author" => Some(&mut self.author),
            _ => None,
        }
    }

    pub fn render(&self) -> Element {
        shell(BlockKind::Quote, None)
            .with_child(field("blockquote", "text", &self.text))
            .with_child(field("cite", "author", &self.author))
    }
}
