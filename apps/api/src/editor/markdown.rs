//! Markdown-style line prefixes typed at the start of a line.

/// Typing three backticks as the whole line, then Enter, opens a code block.
pub const CODE_FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineConversion {
    Heading(u8),
    Quote,
    BulletList,
    OrderedList,
    Checklist,
}

const PARAGRAPH_PREFIXES: &[(&str, LineConversion)] = &[
    ("#", LineConversion::Heading(1)),
    ("##", LineConversion::Heading(2)),
    ("###", LineConversion::Heading(3)),
    (">", LineConversion::Quote),
    ("-", LineConversion::BulletList),
    ("*", LineConversion::BulletList),
    ("1.", LineConversion::OrderedList),
    ("- [ ]", LineConversion::Checklist),
];

/// Called right after a space was typed. `before_caret` is the line text up
/// to the caret, including that space. Returns the conversion and the
/// number of characters the prefix occupies.
pub fn detect(line_tag: &str, before_caret: &str) -> Option<(LineConversion, usize)> {
    let prefix = before_caret.strip_suffix(' ')?;
    let consumed = before_caret.chars().count();
    match line_tag {
        "p" | "div" => PARAGRAPH_PREFIXES
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, conversion)| (*conversion, consumed)),
        // "- " already made a bullet list; "[ ] " inside its item finishes the checklist.
        "li" if prefix == "[ ]" => Some((LineConversion::Checklist, consumed)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_prefixes() {
        assert_eq!(detect("p", "# "), Some((LineConversion::Heading(1), 2)));
        assert_eq!(detect("p", "## "), Some((LineConversion::Heading(2), 3)));
        assert_eq!(detect("p", "### "), Some((LineConversion::Heading(3), 4)));
        assert_eq!(detect("p", "#### "), None);
    }

    #[test]
    fn test_list_and_quote_prefixes() {
        assert_eq!(detect("p", "> "), Some((LineConversion::Quote, 2)));
        assert_eq!(detect("p", "- "), Some((LineConversion::BulletList, 2)));
        assert_eq!(detect("p", "1. "), Some((LineConversion::OrderedList, 3)));
        assert_eq!(detect("p", "- [ ] "), Some((LineConversion::Checklist, 6)));
        assert_eq!(detect("li", "[ ] "), Some((LineConversion::Checklist, 4)));
    }

    #[test]
    fn test_prefix_must_be_whole_line_start() {
        assert_eq!(detect("p", "a # "), None);
        assert_eq!(detect("p", "#"), None);
        assert_eq!(detect("h1", "# "), None);
    }
}
