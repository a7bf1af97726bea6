//! Closed input vocabulary of the editor: keyboard shortcuts, slash-menu
//! items, block actions and clipboard payloads.
//!
//! The rendered HTML still carries `data-action` strings for the browser;
//! `BlockAction::route` is the single place those strings are interpreted.

use serde::{Deserialize, Serialize};

use crate::editor::blocks::{BlockKind, Variant};

// ────────────────────────────────────────────────────────────────────────────
// Keyboard
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyChord {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn with_mod(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn shifted(mut self) -> Self {
        self.shift = true;
        self
    }

    fn has_mod(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    Bold,
    Italic,
    Underline,
    Save,
    InsertKpiBadge,
}

/// (key, shift) → shortcut; every entry requires Mod and no Alt.
const SHORTCUTS: &[(&str, bool, Shortcut)] = &[
    ("b", false, Shortcut::Bold),
    ("i", false, Shortcut::Italic),
    ("u", false, Shortcut::Underline),
    ("s", false, Shortcut::Save),
    ("k", true, Shortcut::InsertKpiBadge),
];

impl Shortcut {
    pub fn lookup(chord: &KeyChord) -> Option<Self> {
        if !chord.has_mod() || chord.alt {
            return None;
        }
        let key = chord.key.to_ascii_lowercase();
        SHORTCUTS
            .iter()
            .find(|(k, shift, _)| *k == key && *shift == chord.shift)
            .map(|(_, _, shortcut)| *shortcut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Bold,
    Italic,
    Underline,
}

impl Format {
    pub fn tag(&self) -> &'static str {
        match self {
            Format::Bold => "b",
            Format::Italic => "i",
            Format::Underline => "u",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Slash menu
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum SlashItem {
    Heading { level: u8 },
    Quote,
    BulletList,
    NumberedList,
    Checklist,
    CodeBlock,
    Divider,
    Block { kind: BlockKind },
}

impl SlashItem {
    /// Menu entries in display order.
    pub fn menu() -> Vec<(SlashItem, &'static str)> {
        let mut items = vec![
            (SlashItem::Heading { level: 1 }, "제목 1"),
            (SlashItem::Heading { level: 2 }, "제목 2"),
            (SlashItem::Heading { level: 3 }, "제목 3"),
            (SlashItem::Quote, "인용"),
            (SlashItem::BulletList, "글머리 기호 목록"),
            (SlashItem::NumberedList, "번호 목록"),
            (SlashItem::Checklist, "체크리스트"),
            (SlashItem::CodeBlock, "코드 블록"),
            (SlashItem::Divider, "구분선"),
        ];
        items.extend([
            (SlashItem::Block { kind: BlockKind::Contact }, "연락처"),
            (SlashItem::Block { kind: BlockKind::Experience }, "경력"),
            (SlashItem::Block { kind: BlockKind::Project }, "프로젝트"),
            (SlashItem::Block { kind: BlockKind::Education }, "학력"),
            (SlashItem::Block { kind: BlockKind::Skills }, "기술 스택"),
            (SlashItem::Block { kind: BlockKind::Kpi }, "핵심 지표"),
            (SlashItem::Block { kind: BlockKind::Awards }, "수상"),
            (SlashItem::Block { kind: BlockKind::Quote }, "인용 카드"),
        ]);
        items
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Click routing
// ────────────────────────────────────────────────────────────────────────────

/// What a click landed on, as reported by the surface. Indices address the
/// chip, bullet or checklist item under the pointer within its block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickTarget {
    pub node: usize,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target_variant: Option<String>,
    #[serde(default)]
    pub chip: Option<usize>,
    #[serde(default)]
    pub bullet: Option<usize>,
    #[serde(default)]
    pub check_item: Option<usize>,
    /// Alt/Meta held during the click.
    #[serde(default)]
    pub modifier: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BlockAction {
    MoveUp,
    MoveDown,
    Delete,
    ToggleCheck { item: usize },
    AddChip,
    RemoveChip { index: usize },
    AddBullet,
    RemoveBullet { index: usize },
    SwitchVariant { variant: Variant },
    UploadImage { field: String },
}

impl BlockAction {
    /// Maps a click to an action. Explicit `data-action` controls win;
    /// otherwise modifier-clicks on chips/bullets remove them and a click on
    /// a checklist item toggles it. Anything else is plain caret placement.
    pub fn route(target: &ClickTarget) -> Option<Self> {
        if let Some(action) = target.action.as_deref() {
            return Self::parse(action, target.target_variant.as_deref());
        }
        if target.modifier {
            if let Some(index) = target.chip {
                return Some(BlockAction::RemoveChip { index });
            }
            if let Some(index) = target.bullet {
                return Some(BlockAction::RemoveBullet { index });
            }
        }
        target
            .check_item
            .map(|item| BlockAction::ToggleCheck { item })
    }

    /// Interprets a `data-action` tag.
    pub fn parse(action: &str, target_variant: Option<&str>) -> Option<Self> {
        Some(match action {
            "move-up" => BlockAction::MoveUp,
            "move-down" => BlockAction::MoveDown,
            "delete" => BlockAction::Delete,
            "add-chip" => BlockAction::AddChip,
            "add-bullet" => BlockAction::AddBullet,
            "upload-logo" => BlockAction::UploadImage {
                field: "logo".to_string(),
            },
            "upload-avatar" => BlockAction::UploadImage {
                field: "avatar".to_string(),
            },
            other => {
                let kind = BlockKind::parse(other.strip_prefix("variant-")?)?;
                if !kind.has_variants() {
                    return None;
                }
                BlockAction::SwitchVariant {
                    variant: Variant::parse(target_variant?)?,
                }
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockAction::MoveUp => "move_up",
            BlockAction::MoveDown => "move_down",
            BlockAction::Delete => "delete",
            BlockAction::ToggleCheck { .. } => "toggle_check",
            BlockAction::AddChip => "add_chip",
            BlockAction::RemoveChip { .. } => "remove_chip",
            BlockAction::AddBullet => "add_bullet",
            BlockAction::RemoveBullet { .. } => "remove_bullet",
            BlockAction::SwitchVariant { .. } => "switch_variant",
            BlockAction::UploadImage { .. } => "upload_image",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Clipboard
// ────────────────────────────────────────────────────────────────────────────

/// Paste payload. HTML wins when the clipboard carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Clipboard {
    Html(String),
    Text(String),
}

impl Clipboard {
    pub fn from_parts(html: Option<String>, text: Option<String>) -> Option<Self> {
        match (html, text) {
            (Some(html), _) if !html.trim().is_empty() => Some(Clipboard::Html(html)),
            (_, Some(text)) => Some(Clipboard::Text(text)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_table() {
        assert_eq!(Shortcut::lookup(&KeyChord::with_mod("b")), Some(Shortcut::Bold));
        assert_eq!(Shortcut::lookup(&KeyChord::with_mod("I")), Some(Shortcut::Italic));
        assert_eq!(Shortcut::lookup(&KeyChord::with_mod("s")), Some(Shortcut::Save));
        assert_eq!(
            Shortcut::lookup(&KeyChord::with_mod("k").shifted()),
            Some(Shortcut::InsertKpiBadge)
        );
        assert_eq!(Shortcut::lookup(&KeyChord::with_mod("k")), None);
        assert_eq!(Shortcut::lookup(&KeyChord::plain("b")), None);
        let meta = KeyChord {
            key: "u".to_string(),
            meta: true,
            ..KeyChord::default()
        };
        assert_eq!(Shortcut::lookup(&meta), Some(Shortcut::Underline));
    }

    #[test]
    fn test_route_data_actions() {
        let click = |action: &str| ClickTarget {
            action: Some(action.to_string()),
            ..ClickTarget::default()
        };
        assert_eq!(BlockAction::route(&click("move-up")), Some(BlockAction::MoveUp));
        assert_eq!(BlockAction::route(&click("add-chip")), Some(BlockAction::AddChip));
        assert_eq!(
            BlockAction::route(&click("upload-logo")),
            Some(BlockAction::UploadImage {
                field: "logo".to_string()
            })
        );
        assert_eq!(BlockAction::route(&click("launch-missiles")), None);
    }

    #[test]
    fn test_route_variant_switch_requires_variant_kind() {
        let mut target = ClickTarget {
            action: Some("variant-experience".to_string()),
            target_variant: Some("text".to_string()),
            ..ClickTarget::default()
        };
        assert_eq!(
            BlockAction::route(&target),
            Some(BlockAction::SwitchVariant {
                variant: Variant::Text
            })
        );
        target.action = Some("variant-quote".to_string());
        assert_eq!(BlockAction::route(&target), None);
    }

    #[test]
    fn test_modifier_click_removes_items() {
        let mut target = ClickTarget {
            chip: Some(2),
            ..ClickTarget::default()
        };
        assert_eq!(BlockAction::route(&target), None);
        target.modifier = true;
        assert_eq!(
            BlockAction::route(&target),
            Some(BlockAction::RemoveChip { index: 2 })
        );
        let bullet = ClickTarget {
            bullet: Some(0),
            modifier: true,
            ..ClickTarget::default()
        };
        assert_eq!(
            BlockAction::route(&bullet),
            Some(BlockAction::RemoveBullet { index: 0 })
        );
    }

    #[test]
    fn test_checklist_click_toggles() {
        let target = ClickTarget {
            check_item: Some(1),
            ..ClickTarget::default()
        };
        assert_eq!(
            BlockAction::route(&target),
            Some(BlockAction::ToggleCheck { item: 1 })
        );
    }

    #[test]
    fn test_clipboard_prefers_html() {
        assert_eq!(
            Clipboard::from_parts(Some("<b>x</b>".into()), Some("x".into())),
            Some(Clipboard::Html("<b>x</b>".into()))
        );
        assert_eq!(
            Clipboard::from_parts(Some("  ".into()), Some("x".into())),
            Some(Clipboard::Text("x".into()))
        );
        assert_eq!(Clipboard::from_parts(None, None), None);
    }
}
