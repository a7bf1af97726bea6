use crate::editor::blocks::{
    action_button, bullet_list, field, fill_blank, image_field, read_bullets, read_src, read_text,
    shell, variant_switcher, BlockKind, Variant,
};
use crate::editor::html::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceFields {
    pub company: String,
    pub role: String,
    pub period: String,
    /// Logo image `src`; empty until uploaded.
    pub logo: String,
    pub bullets: Vec<String>,
}

impl Default for ExperienceFields {
    fn default() -> Self {
        Self {
            company: "회사명".to_string(),
            role: "직무 / 포지션".to_string(),
            period: "2022.01 – 현재".to_string(),
            logo: String::new(),
            bullets: vec![
                "핵심 성과를 한 줄로 요약하세요".to_string(),
                "사용한 기술과 맡은 역할을 적어주세요".to_string(),
                "정량적인 결과(%, 건수, 매출)를 포함하세요".to_string(),
            ],
        }
    }
}

impl ExperienceFields {
    pub fn read(el: &Element) -> Self {
        let d = Self::default();
        Self {
            company: read_text(el, "company", &d.company),
            role: read_text(el, "role", &d.role),
            period: read_text(el, "period", &d.period),
            logo: read_src(el, "logo"),
            bullets: read_bullets(el, &d.bullets),
        }
    }

    pub fn normalize(&mut self) {
        let d = Self::default();
        fill_blank(&mut self.company, &d.company);
        fill_blank(&mut self.role, &d.role);
        fill_blank(&mut self.period, &d.period);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "company" => Some(&mut self.company),
            "role" => Some(&mut self.role),
            "period" => Some(&mut self.period),
            _ => None,
        }
    }

    pub fn render(&self, variant: Variant) -> Element {
        let kind = BlockKind::Experience;
        let body = match variant {
            Variant::Card => shell(kind, Some(variant)).with_child(
                Element::new("div")
                    .with_attr("class", "blk-head")
                    .with_child(image_field("logo", &self.logo, "logo"))
                    .with_child(action_button("upload-logo", "로고"))
                    .with_child(
                        Element::new("div")
                            .with_attr("class", "blk-title")
                            .with_child(field("h3", "company", &self.company))
                            .with_child(field("p", "role", &self.role)),
                    )
                    .with_child(field("span", "period", &self.period)),
            ),
            Variant::Text => shell(kind, Some(variant))
                .with_child(
                    Element::new("p")
                        .with_attr("class", "blk-line")
                        .with_child(field("strong", "company", &self.company))
                        .with_text(" · ")
                        .with_child(field("span", "role", &self.role))
                        .with_text(" · ")
                        .with_child(field("span", "period", &self.period)),
                )
                .with_child(
                    image_field("logo", &self.logo, "logo").with_attr("class", "blk-logo-inline"),
                ),
        };
        body.with_child(bullet_list(&self.bullets))
            .with_child(action_button("add-bullet", "+ 성과 추가"))
            .with_child(variant_switcher(kind, variant))
    }
}
