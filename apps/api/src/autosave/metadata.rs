//! Per-field debounce for document metadata (company, role). Each field has
//! its own deadline so editing one never delays or flushes the other.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::document::MetaField;

#[derive(Debug)]
pub struct MetadataDebouncer {
    quiet_period: Duration,
    pending: BTreeMap<MetaField, (String, Instant)>,
    saved: BTreeMap<MetaField, String>,
}

impl MetadataDebouncer {
    pub fn new(quiet_period: Duration, company: Option<&str>, role: Option<&str>) -> Self {
        let mut saved = BTreeMap::new();
        saved.insert(MetaField::Company, company.unwrap_or_default().to_string());
        saved.insert(MetaField::Role, role.unwrap_or_default().to_string());
        Self {
            quiet_period,
            pending: BTreeMap::new(),
            saved,
        }
    }

    pub fn edit(&mut self, field: MetaField, value: String, now: Instant) {
        self.pending.insert(field, (value, now + self.quiet_period));
    }

    /// Fields whose quiet period elapsed and whose value differs from the
    /// last saved one. Values equal to the saved one are dropped silently.
    pub fn poll(&mut self, now: Instant) -> Vec<(MetaField, String)> {
        let due: Vec<MetaField> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| now >= *deadline)
            .map(|(field, _)| *field)
            .collect();
        let mut out = Vec::new();
        for field in due {
            if let Some((value, _)) = self.pending.remove(&field) {
                if self.saved.get(&field) != Some(&value) {
                    out.push((field, value));
                }
            }
        }
        out
    }

    /// Explicit save: every pending field regardless of deadline.
    pub fn flush(&mut self) -> Vec<(MetaField, String)> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter(|(field, (value, _))| self.saved.get(field) != Some(value))
            .map(|(field, (value, _))| (field, value))
            .collect()
    }

    pub fn mark_saved(&mut self, field: MetaField, value: String) {
        self.saved.insert(field, value);
    }

    pub fn next_wakeup(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(800);

    #[test]
    fn test_fields_have_independent_deadlines() {
        let t0 = Instant::now();
        let mut d = MetadataDebouncer::new(QUIET, None, None);
        d.edit(MetaField::Company, "카카오".into(), t0);
        d.edit(MetaField::Role, "PM".into(), t0 + Duration::from_millis(500));

        assert_eq!(d.poll(t0 + QUIET), vec![(MetaField::Company, "카카오".to_string())]);
        assert_eq!(d.next_wakeup(), Some(t0 + Duration::from_millis(500) + QUIET));
        assert_eq!(
            d.poll(t0 + Duration::from_millis(500) + QUIET),
            vec![(MetaField::Role, "PM".to_string())]
        );
        assert_eq!(d.next_wakeup(), None);
    }

    #[test]
    fn test_editing_one_field_does_not_delay_other() {
        let t0 = Instant::now();
        let mut d = MetadataDebouncer::new(QUIET, None, None);
        d.edit(MetaField::Company, "A".into(), t0);
        d.edit(MetaField::Role, "x".into(), t0 + Duration::from_millis(700));
        d.edit(MetaField::Role, "xy".into(), t0 + Duration::from_millis(790));
        assert_eq!(d.poll(t0 + QUIET), vec![(MetaField::Company, "A".to_string())]);
    }

    #[test]
    fn test_unchanged_value_skipped() {
        let t0 = Instant::now();
        let mut d = MetadataDebouncer::new(QUIET, Some("네이버"), None);
        d.edit(MetaField::Company, "네이버".into(), t0);
        assert!(d.poll(t0 + QUIET).is_empty());

        d.edit(MetaField::Role, "디자이너".into(), t0);
        let flushed = d.flush();
        assert_eq!(flushed, vec![(MetaField::Role, "디자이너".to_string())]);
        d.mark_saved(MetaField::Role, "디자이너".into());
        d.edit(MetaField::Role, "디자이너".into(), t0);
        assert!(d.flush().is_empty());
    }
}
