//! Read-only presentational sections: a title and a body paragraph,
//! editable only through the model, never in place.

use serde::{Deserialize, Serialize};

use crate::editor::blocks::{fill_blank, read_text, shell, BlockKind};
use crate::editor::html::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Certifications,
    Languages,
    Links,
    Interests,
    Volunteer,
    Publications,
    References,
    Signature,
    Divider,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Summary,
        SectionKind::Certifications,
        SectionKind::Languages,
        SectionKind::Links,
        SectionKind::Interests,
        SectionKind::Volunteer,
        SectionKind::Publications,
        SectionKind::References,
        SectionKind::Signature,
        SectionKind::Divider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::Certifications => "certifications",
            SectionKind::Languages => "languages",
            SectionKind::Links => "links",
            SectionKind::Interests => "interests",
            SectionKind::Volunteer => "volunteer",
            SectionKind::Publications => "publications",
            SectionKind::References => "references",
            SectionKind::Signature => "signature",
            SectionKind::Divider => "divider",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        SectionKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFields {
    pub title: String,
    pub body: String,
}

impl SectionFields {
    pub fn default_for(kind: SectionKind) -> Self {
        let (title, body) = match kind {
            SectionKind::Summary => ("자기소개", "지원 직무와 연결되는 강점을 세 문장 이내로 정리하세요."),
            SectionKind::Certifications => ("자격증", "자격증명 · 발급 기관 · 취득일"),
            SectionKind::Languages => ("어학", "영어 — 비즈니스 회화 가능 (OPIc IH)"),
            SectionKind::Links => ("링크", "포트폴리오, 블로그, GitHub 주소"),
            SectionKind::Interests => ("관심 분야", "분산 시스템, 개발자 경험"),
            SectionKind::Volunteer => ("봉사 활동", "기관명 · 기간 · 역할"),
            SectionKind::Publications => ("논문 · 출판", "제목, 학회/저널, 연도"),
            SectionKind::References => ("추천인", "요청 시 제공 가능합니다."),
            SectionKind::Signature => ("서명", "홍길동 드림"),
            SectionKind::Divider => ("", ""),
        };
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    pub fn read(kind: SectionKind, el: &Element) -> Self {
        let d = Self::default_for(kind);
        if kind == SectionKind::Divider {
            return d;
        }
        Self {
            title: read_text(el, "title", &d.title),
            body: read_text(el, "body", &d.body),
        }
    }

    pub fn normalize(&mut self, kind: SectionKind) {
        let d = Self::default_for(kind);
        fill_blank(&mut self.title, &d.title);
        fill_blank(&mut self.body, &d.body);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "title" => Some(&mut self.title),
            "body" => Some(&mut self.body),
            _ => None,
        }
    }

    pub fn render(&self, kind: SectionKind) -> Element {
        let el = shell(BlockKind::Section(kind), None);
        if kind == SectionKind::Divider {
            return el.with_child(Element::new("hr"));
        }
        el.with_child(
            Element::new("h2")
                .with_attr("data-field", "title")
                .with_text(&self.title),
        )
        .with_child(
            Element::new("p")
                .with_attr("data-field", "body")
                .with_text(&self.body),
        )
    }
}
