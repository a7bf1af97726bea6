//! Debounced, diffing autosave as a pure state machine.
//!
//! Time is passed in by the caller. A save request carries the values
//! captured at dispatch and a sequence number; the saved baseline only moves
//! forward when a completion's sequence is newer than the one that last set it.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(800);
pub const DEFAULT_STATUS_LINGER: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Pending,
    Saving,
    Saved,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct AutosaveConfig {
    pub quiet_period: Duration,
    pub status_linger: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            status_linger: DEFAULT_STATUS_LINGER,
        }
    }
}

/// One write to perform. `None` fields are unchanged and must not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub seq: u64,
    pub body: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
struct Tracked {
    saved: String,
    saved_seq: u64,
    current: String,
    /// Latest dispatched value still awaiting completion.
    in_flight: Option<(u64, String)>,
}

impl Tracked {
    fn new(value: String) -> Self {
        Self {
            saved: value.clone(),
            saved_seq: 0,
            current: value,
            in_flight: None,
        }
    }

    fn needs_write(&self) -> bool {
        if self.current == self.saved {
            return false;
        }
        !matches!(&self.in_flight, Some((_, v)) if *v == self.current)
    }

    fn complete(&mut self, seq: u64, value: &str, ok: bool) {
        if ok && seq > self.saved_seq {
            self.saved = value.to_string();
            self.saved_seq = seq;
        }
        if matches!(self.in_flight, Some((s, _)) if s == seq) {
            self.in_flight = None;
        }
    }
}

#[derive(Debug)]
pub struct AutosaveController {
    config: AutosaveConfig,
    body: Tracked,
    title: Tracked,
    deadline: Option<Instant>,
    next_seq: u64,
    in_flight: usize,
    status: SaveStatus,
    linger_until: Option<Instant>,
}

impl AutosaveController {
    pub fn new(config: AutosaveConfig, body: String, title: String) -> Self {
        Self {
            config,
            body: Tracked::new(body),
            title: Tracked::new(title),
            deadline: None,
            next_seq: 1,
            in_flight: 0,
            status: SaveStatus::Idle,
            linger_until: None,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// True when either field differs from what was last confirmed saved.
    pub fn is_dirty(&self) -> bool {
        self.body.current != self.body.saved || self.title.current != self.title.saved
    }

    pub fn saved_body(&self) -> &str {
        &self.body.saved
    }

    pub fn saved_title(&self) -> &str {
        &self.title.saved
    }

    pub fn edit_body(&mut self, html: String, now: Instant) {
        self.body.current = html;
        self.schedule(now);
    }

    pub fn edit_title(&mut self, title: String, now: Instant) {
        self.title.current = title;
        self.schedule(now);
    }

    fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.config.quiet_period);
        self.status = SaveStatus::Pending;
        self.linger_until = None;
    }

    /// Advances timers. Returns a request once the quiet period has elapsed
    /// and something actually changed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        if self.linger_until.is_some_and(|t| now >= t) {
            self.linger_until = None;
            if matches!(self.status, SaveStatus::Saved | SaveStatus::Error) {
                self.status = SaveStatus::Idle;
            }
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.dispatch()
            }
            _ => None,
        }
    }

    /// Skips the debounce (explicit save shortcut).
    pub fn save_now(&mut self) -> Option<SaveRequest> {
        self.deadline = None;
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<SaveRequest> {
        let body = self.body.needs_write().then(|| self.body.current.clone());
        let title = self.title.needs_write().then(|| self.title.current.clone());

        if body.is_none() && title.is_none() {
            debug!("autosave skipped, nothing changed");
            if self.status == SaveStatus::Pending && self.in_flight == 0 {
                self.status = SaveStatus::Idle;
            } else if self.status == SaveStatus::Pending {
                self.status = SaveStatus::Saving;
            }
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(v) = &body {
            self.body.in_flight = Some((seq, v.clone()));
        }
        if let Some(v) = &title {
            self.title.in_flight = Some((seq, v.clone()));
        }
        self.in_flight += 1;
        self.status = SaveStatus::Saving;
        self.linger_until = None;
        debug!(seq, body = body.is_some(), title = title.is_some(), "autosave dispatched");
        Some(SaveRequest { seq, body, title })
    }

    /// Records the outcome of a dispatched request. Failures are not retried
    /// here; the next edit or `save_now` tries again.
    pub fn complete(&mut self, request: &SaveRequest, ok: bool, now: Instant) {
        if let Some(body) = &request.body {
            self.body.complete(request.seq, body, ok);
        }
        if let Some(title) = &request.title {
            self.title.complete(request.seq, title, ok);
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.deadline.is_some() {
            // A newer edit is waiting for its own quiet period.
            return;
        }
        if !ok {
            self.status = SaveStatus::Error;
            self.linger_until = Some(now + self.config.status_linger);
        } else if self.in_flight == 0 && self.status != SaveStatus::Error {
            self.status = SaveStatus::Saved;
            self.linger_until = Some(now + self.config.status_linger);
        }
    }

    /// Earliest instant at which `poll` has work to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.deadline, self.linger_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (AutosaveController, Instant) {
        (
            AutosaveController::new(
                AutosaveConfig::default(),
                "<p>a</p>".to_string(),
                "제목".to_string(),
            ),
            Instant::now(),
        )
    }

    const QUIET: Duration = DEFAULT_QUIET_PERIOD;

    #[test]
    fn test_rapid_edits_coalesce_into_one_save() {
        let (mut c, t0) = controller();
        c.edit_body("<p>ab</p>".into(), t0);
        c.edit_body("<p>abc</p>".into(), t0 + Duration::from_millis(500));
        assert_eq!(c.status(), SaveStatus::Pending);
        assert_eq!(c.poll(t0 + QUIET), None);

        let req = c.poll(t0 + Duration::from_millis(500) + QUIET).unwrap();
        assert_eq!(req.body.as_deref(), Some("<p>abc</p>"));
        assert_eq!(req.title, None);
        assert_eq!(c.status(), SaveStatus::Saving);
    }

    #[test]
    fn test_unchanged_content_is_not_written() {
        let (mut c, t0) = controller();
        c.edit_body("<p>b</p>".into(), t0);
        c.edit_body("<p>a</p>".into(), t0);
        assert_eq!(c.poll(t0 + QUIET), None);
        assert_eq!(c.status(), SaveStatus::Idle);
    }

    #[test]
    fn test_title_and_body_diffed_independently() {
        let (mut c, t0) = controller();
        c.edit_title("새 제목".into(), t0);
        let req = c.poll(t0 + QUIET).unwrap();
        assert_eq!(req.body, None);
        assert_eq!(req.title.as_deref(), Some("새 제목"));
    }

    #[test]
    fn test_saved_then_idle_after_linger() {
        let (mut c, t0) = controller();
        c.edit_body("<p>b</p>".into(), t0);
        let t1 = t0 + QUIET;
        let req = c.poll(t1).unwrap();
        c.complete(&req, true, t1);
        assert_eq!(c.status(), SaveStatus::Saved);
        assert_eq!(c.saved_body(), "<p>b</p>");
        assert_eq!(c.next_wakeup(), Some(t1 + DEFAULT_STATUS_LINGER));
        c.poll(t1 + DEFAULT_STATUS_LINGER);
        assert_eq!(c.status(), SaveStatus::Idle);
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_failure_keeps_state_and_next_edit_retries() {
        let (mut c, t0) = controller();
        c.edit_body("<p>b</p>".into(), t0);
        let req = c.poll(t0 + QUIET).unwrap();
        c.complete(&req, false, t0 + QUIET);
        assert_eq!(c.status(), SaveStatus::Error);
        assert!(c.is_dirty());
        assert_eq!(c.saved_body(), "<p>a</p>");

        // No automatic retry.
        assert_eq!(c.poll(t0 + QUIET * 10), None);

        let retry = c.save_now().unwrap();
        assert_eq!(retry.body.as_deref(), Some("<p>b</p>"));
    }

    #[test]
    fn test_slow_save_does_not_mark_newer_edit_saved() {
        let (mut c, t0) = controller();
        c.edit_body("<p>A</p>".into(), t0);
        let first = c.poll(t0 + QUIET).unwrap();

        c.edit_body("<p>B</p>".into(), t0 + QUIET);
        c.complete(&first, true, t0 + QUIET * 2);
        assert_eq!(c.saved_body(), "<p>A</p>");
        assert!(c.is_dirty());
        assert_eq!(c.status(), SaveStatus::Pending);

        let second = c.poll(t0 + QUIET * 2).unwrap();
        assert_eq!(second.body.as_deref(), Some("<p>B</p>"));
    }

    #[test]
    fn test_out_of_order_completion_keeps_newest_baseline() {
        let (mut c, t0) = controller();
        c.edit_body("<p>A</p>".into(), t0);
        let first = c.poll(t0 + QUIET).unwrap();
        c.edit_body("<p>B</p>".into(), t0 + QUIET);
        let second = c.poll(t0 + QUIET * 2).unwrap();
        assert!(second.seq > first.seq);

        c.complete(&second, true, t0 + QUIET * 3);
        c.complete(&first, true, t0 + QUIET * 3);
        assert_eq!(c.saved_body(), "<p>B</p>");
        assert!(!c.is_dirty());
        assert_eq!(c.status(), SaveStatus::Saved);

        // Reverting to A is a real change again.
        c.edit_body("<p>A</p>".into(), t0 + QUIET * 4);
        assert!(c.poll(t0 + QUIET * 5).is_some());
    }

    #[test]
    fn test_value_already_in_flight_not_sent_twice() {
        let (mut c, t0) = controller();
        c.edit_body("<p>A</p>".into(), t0);
        assert!(c.poll(t0 + QUIET).is_some());
        assert_eq!(c.save_now(), None);
        assert_eq!(c.status(), SaveStatus::Saving);
    }
}
