use crate::editor::blocks::{field, fill_blank, read_text, shell, BlockKind};
use crate::editor::html::Element;

const DEFAULT_VALUE: &str = "0";
const DEFAULT_LABEL: &str = "지표";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiItem {
    pub value: String,
    pub label: String,
}

impl KpiItem {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Grid of headline metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiFields {
    pub items: Vec<KpiItem>,
}

impl Default for KpiFields {
    fn default() -> Self {
        Self {
            items: vec![
                KpiItem::new("+120%", "매출 성장"),
                KpiItem::new("3.2M", "월간 활성 사용자"),
                KpiItem::new("-40%", "평균 응답 시간"),
            ],
        }
    }
}

impl KpiFields {
    pub fn read(el: &Element) -> Self {
        let cells = el.find_all(&|e| e.attr("data-kpi").is_some());
        if cells.is_empty() {
            return Self::default();
        }
        Self {
            items: cells
                .into_iter()
                .map(|cell| KpiItem {
                    value: read_text(cell, "kpi-value", DEFAULT_VALUE),
                    label: read_text(cell, "kpi-label", DEFAULT_LABEL),
                })
                .collect(),
        }
    }

    pub fn normalize(&mut self) {
        if self.items.is_empty() {
            *self = Self::default();
        }
        for item in &mut self.items {
            fill_blank(&mut item.value, DEFAULT_VALUE);
            fill_blank(&mut item.label, DEFAULT_LABEL);
        }
    }

    pub fn render(&self) -> Element {
        let mut grid = Element::new("div").with_attr("class", "kpi-grid");
        for item in &self.items {
            grid.children.push(
                Element::new("div")
                    .with_attr("class", "kpi")
                    .with_attr("data-kpi", "1")
                    .with_child(field("strong", "kpi-value", &item.value))
                    .with_child(field("span", "kpi-label", &item.label))
                    .into(),
            );
        }
        shell(BlockKind::Kpi, None).with_child(grid)
    }
}
