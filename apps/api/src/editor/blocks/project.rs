use crate::editor::blocks::{
    action_button, bullet_list, chip_list, field, fill_blank, read_bullets, read_chips, read_text,
    shell, variant_switcher, BlockKind, Variant,
};
use crate::editor::html::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub period: String,
    pub summary: String,
    pub link: String,
    /// Tech-stack chips.
    pub stack: Vec<String>,
    pub bullets: Vec<String>,
}

impl Default for ProjectFields {
    fn default() -> Self {
        Self {
            name: "프로젝트명".to_string(),
            period: "2024.03 – 2024.08".to_string(),
            summary: "프로젝트를 한 문장으로 소개하세요".to_string(),
            link: "github.com/username/project".to_string(),
            stack: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            bullets: vec![
                "해결한 문제와 접근 방법".to_string(),
                "측정 가능한 결과".to_string(),
            ],
        }
    }
}

impl ProjectFields {
    pub fn read(el: &Element) -> Self {
        let d = Self::default();
        Self {
            name: read_text(el, "name", &d.name),
            period: read_text(el, "period", &d.period),
            summary: read_text(el, "summary", &d.summary),
            link: read_text(el, "link", &d.link),
            stack: read_chips(el, "stack", &d.stack),
            bullets: read_bullets(el, &d.bullets),
        }
    }

    pub fn normalize(&mut self) {
        let d = Self::default();
        fill_blank(&mut self.name, &d.name);
        fill_blank(&mut self.period, &d.period);
        fill_blank(&mut self.summary, &d.summary);
        fill_blank(&mut self.link, &d.link);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "period" => Some(&mut self.period),
            "summary" => Some(&mut self.summary),
            "link" => Some(&mut self.link),
            _ => None,
        }
    }

    pub fn render(&self, variant: Variant) -> Element {
        let kind = BlockKind::Project;
        let head = match variant {
            Variant::Card => shell(kind, Some(variant))
                .with_child(
                    Element::new("div")
                        .with_attr("class", "blk-head")
                        .with_child(field("h3", "name", &self.name))
                        .with_child(field("span", "period", &self.period)),
                )
                .with_child(field("p", "summary", &self.summary))
                .with_child(chip_list("stack", &self.stack)),
            Variant::Text => shell(kind, Some(variant))
                .with_child(
                    Element::new("p")
                        .with_attr("class", "blk-line")
                        .with_child(field("strong", "name", &self.name))
                        .with_text(" · ")
                        .with_child(field("span", "period", &self.period)),
                )
                .with_child(field("p", "summary", &self.summary))
                .with_child(
                    Element::new("div")
                        .with_attr("class", "blk-stack")
                        .with_text("Stack: ")
                        .with_child(chip_list("stack", &self.stack)),
                ),
        };
        head.with_child(bullet_list(&self.bullets))
            .with_child(action_button("add-bullet", "+ 항목 추가"))
            .with_child(field("p", "link", &self.link))
            .with_child(variant_switcher(kind, variant))
    }
}
