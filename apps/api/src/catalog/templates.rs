//! Static document templates. Applying one replays its directives in order
//! through the editor's insertion primitive.

use serde::Serialize;
use tracing::debug;

use crate::editor::blocks::{Block, BlockKind, SectionKind};
use crate::editor::html::{Element, Node};
use crate::editor::placeholders::PlaceholderContext;
use crate::editor::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Heading { level: u8, text: &'static str },
    Paragraph { text: &'static str },
    Bullets { items: &'static [&'static str] },
    KeyValue { rows: &'static [(&'static str, &'static str)] },
    Block { kind: BlockKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub directives: &'static [Directive],
}

static TEMPLATES: &[Template] = &[
    Template {
        id: "resume-basic",
        name: "기본 이력서",
        tags: &["resume"],
        directives: &[
            Directive::Block { kind: BlockKind::Contact },
            Directive::Block { kind: BlockKind::Section(SectionKind::Summary) },
            Directive::Heading { level: 2, text: "경력" },
            Directive::Block { kind: BlockKind::Experience },
            Directive::Heading { level: 2, text: "학력" },
            Directive::Block { kind: BlockKind::Education },
            Directive::Block { kind: BlockKind::Skills },
        ],
    },
    Template {
        id: "resume-developer",
        name: "개발자 이력서",
        tags: &["resume", "developer"],
        directives: &[
            Directive::Block { kind: BlockKind::Contact },
            Directive::Paragraph { text: "{{role}} 포지션에 지원하는 개발자입니다." },
            Directive::Block { kind: BlockKind::Kpi },
            Directive::Heading { level: 2, text: "경력" },
            Directive::Block { kind: BlockKind::Experience },
            Directive::Heading { level: 2, text: "프로젝트" },
            Directive::Block { kind: BlockKind::Project },
            Directive::Block { kind: BlockKind::Skills },
            Directive::Block { kind: BlockKind::Section(SectionKind::Links) },
        ],
    },
    Template {
        id: "cover-letter",
        name: "자기소개서",
        tags: &["cover_letter"],
        directives: &[
            Directive::Heading { level: 1, text: "{{company}} 지원 자기소개서" },
            Directive::KeyValue {
                rows: &[("지원 회사", "{{company}}"), ("지원 직무", "{{role}}")],
            },
            Directive::Heading { level: 2, text: "지원 동기" },
            Directive::Paragraph {
                text: "{{company}}의 {{role}} 포지션에 지원하게 된 이유를 적어주세요.",
            },
            Directive::Heading { level: 2, text: "핵심 역량" },
            Directive::Bullets {
                items: &["역량을 수치와 함께 적어주세요", "관련 경험을 적어주세요"],
            },
            Directive::Heading { level: 2, text: "입사 후 포부" },
            Directive::Paragraph { text: "입사 후 이루고 싶은 목표를 적어주세요." },
            Directive::Block { kind: BlockKind::Section(SectionKind::Signature) },
        ],
    },
    Template {
        id: "portfolio-project",
        name: "포트폴리오 프로젝트",
        tags: &["portfolio"],
        directives: &[
            Directive::Heading { level: 1, text: "프로젝트 이름" },
            Directive::Block { kind: BlockKind::Project },
            Directive::Heading { level: 2, text: "문제" },
            Directive::Paragraph { text: "해결하려던 문제를 적어주세요." },
            Directive::Heading { level: 2, text: "결과" },
            Directive::Block { kind: BlockKind::Kpi },
            Directive::Block { kind: BlockKind::Quote },
        ],
    },
];

pub fn templates() -> &'static [Template] {
    TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Replays every directive at the caret. Returns the index of the first
/// inserted node.
pub fn apply_template(editor: &mut Editor, template: &Template) -> usize {
    let context = editor.context().clone();
    let mut first = None;
    for directive in template.directives {
        let at = match directive {
            Directive::Block { kind } => editor.insert_block(*kind),
            _ => editor.insert_nodes(vec![Node::Element(render_directive(directive, &context))]),
        };
        first.get_or_insert(at);
    }
    debug!(template = template.id, nodes = template.directives.len(), "applied template");
    first.unwrap_or(editor.caret().node)
}

fn render_directive(directive: &Directive, context: &PlaceholderContext) -> Element {
    match directive {
        Directive::Heading { level, text } => {
            Element::new(&format!("h{}", (*level).clamp(1, 3))).with_text(&context.fill(text))
        }
        Directive::Paragraph { text } => Element::new("p").with_text(&context.fill(text)),
        Directive::Bullets { items } => items.iter().fold(Element::new("ul"), |ul, item| {
            ul.with_child(Element::new("li").with_text(&context.fill(item)))
        }),
        Directive::KeyValue { rows } => {
            let body = rows.iter().fold(Element::new("tbody"), |body, (key, value)| {
                body.with_child(
                    Element::new("tr")
                        .with_child(Element::new("th").with_text(&context.fill(key)))
                        .with_child(Element::new("td").with_text(&context.fill(value))),
                )
            });
            Element::new("table").with_child(body)
        }
        Directive::Block { kind } => Block::default_for(*kind).render(),
    }
}
