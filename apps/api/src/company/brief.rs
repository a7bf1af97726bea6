//! "Company brief": a short summary of a company for a cover letter, as
//! plain text and as insertable HTML.

use crate::company::source::CompanyInfo;
use crate::editor::html::{to_html, Element, Node};

pub const MAX_NEWS_ITEMS: usize = 3;

/// Formats with thousands separators: 12345 -> "12,345".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn facts(info: &CompanyInfo) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(industry) = info.industry.as_deref().filter(|s| !s.trim().is_empty()) {
        rows.push(("업종", industry.trim().to_string()));
    }
    if let Some(year) = info.founded_year {
        rows.push(("설립", format!("{year}년")));
    }
    if let Some(employees) = info.employees {
        rows.push(("임직원", format!("{}명", group_thousands(employees.into()))));
    }
    if let Some(homepage) = info.homepage.as_deref().filter(|s| !s.trim().is_empty()) {
        rows.push(("홈페이지", homepage.trim().to_string()));
    }
    rows
}

pub fn format_brief(info: &CompanyInfo) -> String {
    let mut lines = vec![format!("■ {}", info.name)];
    if let Some(summary) = info.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(summary.trim().to_string());
    }
    lines.extend(facts(info).into_iter().map(|(k, v)| format!("{k}: {v}")));
    if !info.news.is_empty() {
        lines.push("최근 소식".to_string());
        lines.extend(
            info.news
                .iter()
                .take(MAX_NEWS_ITEMS)
                .map(|item| format!("- {}", item.title.trim())),
        );
    }
    lines.join("\n")
}

/// The same brief as editor nodes: heading, summary, facts and news links.
pub fn brief_html(info: &CompanyInfo) -> String {
    let mut nodes: Vec<Node> = vec![Element::new("h3").with_text(&info.name).into()];
    if let Some(summary) = info.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        nodes.push(Element::new("p").with_text(summary.trim()).into());
    }
    let rows = facts(info);
    if !rows.is_empty() {
        let body = rows.into_iter().fold(Element::new("tbody"), |body, (k, v)| {
            body.with_child(
                Element::new("tr")
                    .with_child(Element::new("th").with_text(k))
                    .with_child(Element::new("td").with_text(&v)),
            )
        });
        nodes.push(Element::new("table").with_child(body).into());
    }
    if !info.news.is_empty() {
        let list = info.news.iter().take(MAX_NEWS_ITEMS).fold(Element::new("ul"), |ul, item| {
            let link = Element::new("a")
                .with_attr("href", item.url.as_str())
                .with_attr("target", "_blank")
                .with_attr("rel", "noopener")
                .with_text(item.title.trim());
            ul.with_child(Element::new("li").with_child(link))
        });
        nodes.push(list.into());
    }
    to_html(&nodes)
}
