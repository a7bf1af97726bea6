use crate::editor::blocks::{chip_list, field, fill_blank, read_chips, read_text, shell, BlockKind};
use crate::editor::html::Element;

/// Title plus chip list; shared by the skills and awards blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipFields {
    pub title: String,
    pub chips: Vec<String>,
}

impl ChipFields {
    pub fn skills() -> Self {
        Self {
            title: "기술 스택".to_string(),
            chips: vec![
                "Rust".to_string(),
                "TypeScript".to_string(),
                "PostgreSQL".to_string(),
            ],
        }
    }

    pub fn awards() -> Self {
        Self {
            title: "수상 · 자격".to_string(),
            chips: vec!["정보처리기사".to_string()],
        }
    }

    pub fn read(el: &Element, defaults: ChipFields) -> Self {
        Self {
            title: read_text(el, "title", &defaults.title),
            chips: read_chips(el, "chips", &defaults.chips),
        }
    }

    pub fn normalize(&mut self, defaults: ChipFields) {
        fill_blank(&mut self.title, &defaults.title);
    }

    pub fn render(&self, kind: BlockKind) -> Element {
        shell(kind, None)
            .with_child(field("h2", "title", &self.title))
            .with_child(chip_list("chips", &self.chips))
    }
}
