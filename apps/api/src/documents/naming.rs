//! Sibling-name collision resolution: "새 문서", "새 문서 (2)", ...

use std::collections::HashSet;

pub const DEFAULT_DOCUMENT_TITLE: &str = "새 문서";
pub const DEFAULT_FOLDER_NAME: &str = "새 폴더";
pub const MAX_NAME_CHARS: usize = 100;

/// Trims and truncates a requested name, falling back to `default` when blank.
pub fn normalize_name(requested: Option<&str>, default: &str) -> String {
    let trimmed = requested.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return default.to_string();
    }
    trimmed.chars().take(MAX_NAME_CHARS).collect::<String>().trim_end().to_string()
}

/// Returns `base` if no sibling has it, else the first free `base (n)` with n >= 2.
pub fn resolve_unique_name<S: AsRef<str>>(base: &str, siblings: &[S]) -> String {
    let taken: HashSet<&str> = siblings.iter().map(|s| s.as_ref()).collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
