//! `{{token}}` substitution for inserted AI text and template paragraphs.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Values known at insertion time. Unset values leave their tokens verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderContext {
    pub company: Option<String>,
    pub role: Option<String>,
}

impl PlaceholderContext {
    fn lookup(&self, token: &str) -> Option<&str> {
        let value = match token {
            "company" => self.company.as_deref(),
            "role" => self.role.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn fill(&self, text: &str) -> String {
        token_pattern()
            .replace_all(text, |caps: &Captures| {
                self.lookup(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PlaceholderContext {
        PlaceholderContext {
            company: Some("네이버".to_string()),
            role: Some("백엔드 엔지니어".to_string()),
        }
    }

    #[test]
    fn test_known_tokens_filled() {
        assert_eq!(
            ctx().fill("{{company}}의 {{ role }} 포지션에 지원합니다"),
            "네이버의 백엔드 엔지니어 포지션에 지원합니다"
        );
    }

    #[test]
    fn test_unknown_and_unset_tokens_left_verbatim() {
        let partial = PlaceholderContext {
            company: None,
            role: Some("PM".to_string()),
        };
        assert_eq!(
            partial.fill("{{company}} / {{role}} / {{team}}"),
            "{{company}} / PM / {{team}}"
        );
    }
}
