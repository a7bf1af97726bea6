//! Structured content blocks: kinds, variants, field sets and their HTML templates.
//!
//! A block is always rendered from its fields. Reading goes the other way:
//! `read` extracts fields from a block element in either variant, and
//! `switch_variant` is render(read(..)). Nothing else changes a block's
//! variant.
//!
//! Field values are plain text. A blank scalar field is replaced by its
//! default both on write (`normalize`) and on read, so a block always
//! renders the same HTML it was read from.

mod contact;
mod education;
mod experience;
mod kpi;
mod project;
mod quote;
mod sections;
mod skills;

use serde::{Deserialize, Serialize};

use crate::editor::html::{Element, Node};

pub use contact::ContactFields;
pub use education::EducationFields;
pub use experience::ExperienceFields;
pub use kpi::{KpiFields, KpiItem};
pub use project::ProjectFields;
pub use quote::QuoteFields;
pub use sections::{SectionFields, SectionKind};
pub use skills::ChipFields;

pub const DEFAULT_CHIP: &str = "새 항목";
pub const DEFAULT_BULLET: &str = "성과를 수치와 함께 입력하세요";

// ────────────────────────────────────────────────────────────────────────────
// Kinds and variants
// ────────────────────────────────────────────────────────────────────────────

/// Serialized as its `data-block` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockKind {
    Skills,
    Education,
    Experience,
    Project,
    Kpi,
    Awards,
    Quote,
    Contact,
    Section(SectionKind),
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Skills => "skills",
            BlockKind::Education => "education",
            BlockKind::Experience => "experience",
            BlockKind::Project => "project",
            BlockKind::Kpi => "kpi",
            BlockKind::Awards => "awards",
            BlockKind::Quote => "quote",
            BlockKind::Contact => "contact",
            BlockKind::Section(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "skills" => BlockKind::Skills,
            "education" => BlockKind::Education,
            "experience" => BlockKind::Experience,
            "project" => BlockKind::Project,
            "kpi" => BlockKind::Kpi,
            "awards" => BlockKind::Awards,
            "quote" => BlockKind::Quote,
            "contact" => BlockKind::Contact,
            other => BlockKind::Section(SectionKind::parse(other)?),
        })
    }

    pub fn has_variants(&self) -> bool {
        matches!(
            self,
            BlockKind::Education | BlockKind::Experience | BlockKind::Project
        )
    }

    /// Every kind the catalog can insert, in menu order.
    pub fn all() -> Vec<BlockKind> {
        let mut kinds = vec![
            BlockKind::Contact,
            BlockKind::Experience,
            BlockKind::Project,
            BlockKind::Education,
            BlockKind::Skills,
            BlockKind::Kpi,
            BlockKind::Awards,
            BlockKind::Quote,
        ];
        kinds.extend(SectionKind::ALL.iter().copied().map(BlockKind::Section));
        kinds
    }
}

impl TryFrom<String> for BlockKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BlockKind::parse(&value).ok_or_else(|| format!("unknown block kind '{value}'"))
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Card,
    Text,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Card => "card",
            Variant::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(Variant::Card),
            "text" => Some(Variant::Text),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Variant::Card => Variant::Text,
            Variant::Text => Variant::Card,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field sets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFields {
    Skills(ChipFields),
    Awards(ChipFields),
    Education(EducationFields),
    Experience(ExperienceFields),
    Project(ProjectFields),
    Kpi(KpiFields),
    Quote(QuoteFields),
    Contact(ContactFields),
    Section {
        section: SectionKind,
        fields: SectionFields,
    },
}

impl BlockFields {
    /// Fresh field set used for insertion and as the read fallback.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Skills => BlockFields::Skills(ChipFields::skills()),
            BlockKind::Awards => BlockFields::Awards(ChipFields::awards()),
            BlockKind::Education => BlockFields::Education(EducationFields::default()),
            BlockKind::Experience => BlockFields::Experience(ExperienceFields::default()),
            BlockKind::Project => BlockFields::Project(ProjectFields::default()),
            BlockKind::Kpi => BlockFields::Kpi(KpiFields::default()),
            BlockKind::Quote => BlockFields::Quote(QuoteFields::default()),
            BlockKind::Contact => BlockFields::Contact(ContactFields::default()),
            BlockKind::Section(section) => BlockFields::Section {
                section,
                fields: SectionFields::default_for(section),
            },
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockFields::Skills(_) => BlockKind::Skills,
            BlockFields::Awards(_) => BlockKind::Awards,
            BlockFields::Education(_) => BlockKind::Education,
            BlockFields::Experience(_) => BlockKind::Experience,
            BlockFields::Project(_) => BlockKind::Project,
            BlockFields::Kpi(_) => BlockKind::Kpi,
            BlockFields::Quote(_) => BlockKind::Quote,
            BlockFields::Contact(_) => BlockKind::Contact,
            BlockFields::Section { section, .. } => BlockKind::Section(*section),
        }
    }

    /// Extracts the field set of `kind` from a block element of either variant.
    pub fn read(kind: BlockKind, el: &Element) -> Self {
        match kind {
            BlockKind::Skills => BlockFields::Skills(ChipFields::read(el, ChipFields::skills())),
            BlockKind::Awards => BlockFields::Awards(ChipFields::read(el, ChipFields::awards())),
            BlockKind::Education => BlockFields::Education(EducationFields::read(el)),
            BlockKind::Experience => BlockFields::Experience(ExperienceFields::read(el)),
            BlockKind::Project => BlockFields::Project(ProjectFields::read(el)),
            BlockKind::Kpi => BlockFields::Kpi(KpiFields::read(el)),
            BlockKind::Quote => BlockFields::Quote(QuoteFields::read(el)),
            BlockKind::Contact => BlockFields::Contact(ContactFields::read(el)),
            BlockKind::Section(section) => BlockFields::Section {
                section,
                fields: SectionFields::read(section, el),
            },
        }
    }

    /// Replaces blank scalar fields with their defaults.
    pub fn normalize(&mut self) {
        match self {
            BlockFields::Skills(f) => f.normalize(ChipFields::skills()),
            BlockFields::Awards(f) => f.normalize(ChipFields::awards()),
            BlockFields::Education(f) => f.normalize(),
            BlockFields::Experience(f) => f.normalize(),
            BlockFields::Project(f) => f.normalize(),
            BlockFields::Kpi(f) => f.normalize(),
            BlockFields::Quote(f) => f.normalize(),
            BlockFields::Contact(f) => f.normalize(),
            BlockFields::Section { section, fields } => fields.normalize(*section),
        }
    }

    /// Sets a named scalar field. Returns false when the kind has no such field.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        let value = value.to_string();
        let slot: Option<&mut String> = match self {
            BlockFields::Skills(f) | BlockFields::Awards(f) => match name {
                "title" => Some(&mut f.title),
                _ => None,
            },
            BlockFields::Education(f) => f.slot(name),
            BlockFields::Experience(f) => f.slot(name),
            BlockFields::Project(f) => f.slot(name),
            BlockFields::Kpi(_) => None,
            BlockFields::Quote(f) => f.slot(name),
            BlockFields::Contact(f) => f.slot(name),
            BlockFields::Section { section, fields } => {
                if *section == SectionKind::Divider {
                    None
                } else {
                    fields.slot(name)
                }
            }
        };
        match slot {
            Some(slot) => {
                *slot = value;
                self.normalize();
                true
            }
            None => false,
        }
    }

    pub fn chips_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            BlockFields::Skills(f) | BlockFields::Awards(f) => Some(&mut f.chips),
            BlockFields::Project(f) => Some(&mut f.stack),
            _ => None,
        }
    }

    pub fn bullets_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            BlockFields::Experience(f) => Some(&mut f.bullets),
            BlockFields::Project(f) => Some(&mut f.bullets),
            _ => None,
        }
    }

    /// The image field an upload action may target, if the kind has one.
    pub fn image_slot(&mut self, field: &str) -> Option<&mut String> {
        match (self, field) {
            (BlockFields::Experience(f), "logo") => Some(&mut f.logo),
            (BlockFields::Contact(f), "avatar") => Some(&mut f.avatar),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub variant: Option<Variant>,
    pub fields: BlockFields,
}

impl Block {
    pub fn new(mut fields: BlockFields, variant: Variant) -> Self {
        fields.normalize();
        let variant = fields.kind().has_variants().then_some(variant);
        Self { variant, fields }
    }

    pub fn default_for(kind: BlockKind) -> Self {
        Self::new(BlockFields::default_for(kind), Variant::Card)
    }

    pub fn kind(&self) -> BlockKind {
        self.fields.kind()
    }

    /// Builds a block from a `data-block` element. `None` for unknown kinds.
    pub fn from_element(el: &Element) -> Option<Self> {
        let kind = BlockKind::parse(el.attr("data-block")?)?;
        let variant = el
            .attr("data-variant")
            .and_then(Variant::parse)
            .unwrap_or(Variant::Card);
        Some(Self::new(BlockFields::read(kind, el), variant))
    }

    pub fn render(&self) -> Element {
        let variant = self.variant.unwrap_or(Variant::Card);
        match &self.fields {
            BlockFields::Skills(f) => f.render(BlockKind::Skills),
            BlockFields::Awards(f) => f.render(BlockKind::Awards),
            BlockFields::Education(f) => f.render(variant),
            BlockFields::Experience(f) => f.render(variant),
            BlockFields::Project(f) => f.render(variant),
            BlockFields::Kpi(f) => f.render(),
            BlockFields::Quote(f) => f.render(),
            BlockFields::Contact(f) => f.render(),
            BlockFields::Section { section, fields } => fields.render(*section),
        }
    }

    pub fn to_html(&self) -> String {
        self.render().to_html()
    }

    /// Re-renders the block in `target` through its field reader.
    /// Kinds without variants are left untouched.
    pub fn switch_variant(&mut self, target: Variant) {
        if !self.kind().has_variants() {
            return;
        }
        let rendered = self.render();
        let fields = BlockFields::read(self.kind(), &rendered);
        *self = Block::new(fields, target);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared template helpers
// ────────────────────────────────────────────────────────────────────────────

/// The outer `<section>` every block renders into.
pub(crate) fn shell(kind: BlockKind, variant: Option<Variant>) -> Element {
    let mut el = Element::new("section").with_attr("data-block", kind.as_str());
    let mut class = format!("blk blk-{}", kind.as_str());
    if let Some(v) = variant {
        el.set_attr("data-variant", v.as_str());
        class.push(' ');
        class.push_str(v.as_str());
    }
    el.with_attr("class", class)
}

/// An editable scalar field element.
pub(crate) fn field(tag: &str, name: &str, value: &str) -> Element {
    Element::new(tag)
        .with_attr("data-field", name)
        .with_attr("contenteditable", "true")
        .with_text(value)
}

pub(crate) fn image_field(name: &str, src: &str, alt: &str) -> Element {
    Element::new("img")
        .with_attr("data-field", name)
        .with_attr("src", src)
        .with_attr("alt", alt)
}

/// A non-editable control routed by the click handler.
pub(crate) fn action_button(action: &str, label: &str) -> Element {
    Element::new("button")
        .with_attr("data-action", action)
        .with_attr("contenteditable", "false")
        .with_text(label)
}

pub(crate) fn variant_switcher(kind: BlockKind, current: Variant) -> Element {
    let target = current.other();
    let label = match target {
        Variant::Card => "카드형",
        Variant::Text => "텍스트형",
    };
    Element::new("div")
        .with_attr("class", "blk-variants")
        .with_attr("contenteditable", "false")
        .with_child(
            action_button(&format!("variant-{}", kind.as_str()), label)
                .with_attr("data-target-variant", target.as_str()),
        )
}

pub(crate) fn chip_list(name: &str, chips: &[String]) -> Element {
    let mut list = Element::new("div")
        .with_attr("data-field", name)
        .with_attr("class", "chips");
    for chip in chips {
        list.children.push(
            Element::new("span")
                .with_attr("data-chip", "1")
                .with_attr("contenteditable", "true")
                .with_text(chip)
                .into(),
        );
    }
    list.children.push(
        Element::new("span")
            .with_attr("data-action", "add-chip")
            .with_attr("contenteditable", "false")
            .with_text("+")
            .into(),
    );
    list
}

pub(crate) fn bullet_list(bullets: &[String]) -> Element {
    let mut list = Element::new("ul").with_attr("data-field", "bullets");
    for bullet in bullets {
        list.children.push(
            Element::new("li")
                .with_attr("contenteditable", "true")
                .with_text(bullet)
                .into(),
        );
    }
    list
}

/// Text of a scalar field, or `default` when missing or blank.
pub(crate) fn read_text(el: &Element, name: &str, default: &str) -> String {
    el.field(name)
        .map(Element::text_content)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn read_src(el: &Element, name: &str) -> String {
    el.field(name)
        .and_then(|img| img.attr("src"))
        .unwrap_or_default()
        .to_string()
}

/// Chips inside the named field, or `default` when the field is missing.
pub(crate) fn read_chips(el: &Element, name: &str, default: &[String]) -> Vec<String> {
    match el.field(name) {
        Some(list) => list
            .find_all(&|e| e.attr("data-chip").is_some())
            .into_iter()
            .map(Element::text_content)
            .collect(),
        None => default.to_vec(),
    }
}

/// Bullet items, or `default` when the list is missing. An empty list stays empty.
pub(crate) fn read_bullets(el: &Element, default: &[String]) -> Vec<String> {
    match el.field("bullets") {
        Some(list) => list
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter(|li| li.tag == "li")
            .map(Element::text_content)
            .collect(),
        None => default.to_vec(),
    }
}

pub(crate) fn fill_blank(slot: &mut String, default: &str) {
    if slot.trim().is_empty() {
        *slot = default.to_string();
    }
}
