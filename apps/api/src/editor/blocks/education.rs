use crate::editor::blocks::{field, fill_blank, read_text, shell, variant_switcher, BlockKind, Variant};
use crate::editor::html::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationFields {
    pub school: String,
    pub degree: String,
    pub period: String,
    pub detail: String,
}

impl Default for EducationFields {
    fn default() -> Self {
        Self {
            school: "학교명".to_string(),
            degree: "전공 / 학위".to_string(),
            period: "2016.03 – 2022.02".to_string(),
            detail: "주요 이수 과목, 학점, 졸업 프로젝트".to_string(),
        }
    }
}

impl EducationFields {
    pub fn read(el: &Element) -> Self {
        let d = Self::default();
        Self {
            school: read_text(el, "school", &d.school),
            degree: read_text(el, "degree", &d.degree),
            period: read_text(el, "period", &d.period),
            detail: read_text(el, "detail", &d.detail),
        }
    }

    pub fn normalize(&mut self) {
        let d = Self::default();
        fill_blank(&mut self.school, &d.school);
        fill_blank(&mut self.degree, &d.degree);
        fill_blank(&mut self.period, &d.period);
        fill_blank(&mut self.detail, &d.detail);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "school" => Some(&mut self.school),
            "degree" => Some(&mut self.degree),
            "period" => Some(&mut self.period),
            "detail" => Some(&mut self.detail),
            _ => None,
        }
    }

    pub fn render(&self, variant: Variant) -> Element {
        let kind = BlockKind::Education;
        let el = match variant {
            Variant::Card => shell(kind, Some(variant))
                .with_child(
                    Element::new("div")
                        .with_attr("class", "blk-head")
                        .with_child(field("h3", "school", &self.school))
                        .with_child(field("span", "period", &self.period)),
                )
                .with_child(field("p", "degree", &self.degree))
                .with_child(field("p", "detail", &self.detail)),
            Variant::Text => shell(kind, Some(variant))
                .with_child(
                    Element::new("p")
                        .with_attr("class", "blk-line")
                        .with_child(field("strong", "school", &self.school))
                        .with_text(" · ")
                        .with_child(field("span", "degree", &self.degree))
                        .with_text(" · ")
                        .with_child(field("span", "period", &self.period)),
                )
                .with_child(field("p", "detail", &self.detail)),
        };
        el.with_child(variant_switcher(kind, variant))
    }
}
