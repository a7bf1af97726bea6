//! Cached, single-flight company lookups with a quota cooldown gate.
//!
//! Concurrent lookups of the same company share one upstream request. A
//! quota error closes the gate for `cooldown`; while it is closed every
//! uncached lookup fails fast without touching the upstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::company::clock::Clock;
use crate::company::source::{CompanyInfo, CompanySource, SourceError};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_QUOTA_COOLDOWN: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("회사 이름을 입력해주세요.")]
    EmptyName,

    #[error("company lookups paused for {}s", .retry_after.as_secs())]
    CoolingDown { retry_after: Duration },

    #[error("company '{0}' not found")]
    NotFound(String),

    #[error("company API error: {0}")]
    Upstream(String),
}

type Flight = Arc<OnceCell<Result<Arc<CompanyInfo>, LookupError>>>;

struct CacheEntry {
    info: Arc<CompanyInfo>,
    fetched_at: Instant,
}

pub struct CompanyLookup {
    source: Arc<dyn CompanySource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cooldown: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
    in_flight: tokio::sync::Mutex<HashMap<String, Flight>>,
    blocked_until: Mutex<Option<Instant>>,
}

/// Case- and whitespace-insensitive cache key.
pub fn cache_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl CompanyLookup {
    pub fn new(
        source: Arc<dyn CompanySource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        cooldown: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            ttl,
            cooldown,
            cache: Mutex::new(HashMap::new()),
            in_flight: tokio::sync::Mutex::new(HashMap::new()),
            blocked_until: Mutex::new(None),
        }
    }

    pub async fn lookup(&self, name: &str) -> Result<Arc<CompanyInfo>, LookupError> {
        let name = name.trim();
        let key = cache_key(name);
        if key.is_empty() {
            return Err(LookupError::EmptyName);
        }
        if let Some(info) = self.cached(&key) {
            debug!("Company cache hit for '{key}'");
            return Ok(info);
        }
        self.check_gate()?;

        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.clone()).or_default().clone()
        };
        let result = flight
            .get_or_init(|| self.fetch_and_store(&key, name))
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(&key).is_some_and(|f| Arc::ptr_eq(f, &flight)) {
            in_flight.remove(&key);
        }
        result
    }

    fn cached(&self, key: &str) -> Option<Arc<CompanyInfo>> {
        let now = self.clock.now();
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        match cache.get(key) {
            Some(entry) if now.duration_since(entry.fetched_at) < self.ttl => Some(entry.info.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    fn check_gate(&self) -> Result<(), LookupError> {
        let now = self.clock.now();
        let mut blocked = self.blocked_until.lock().unwrap_or_else(|e| e.into_inner());
        match *blocked {
            Some(until) if now < until => Err(LookupError::CoolingDown {
                retry_after: until - now,
            }),
            Some(_) => {
                info!("Company lookup cooldown elapsed");
                *blocked = None;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn fetch_and_store(&self, key: &str, name: &str) -> Result<Arc<CompanyInfo>, LookupError> {
        match self.source.fetch(name).await {
            Ok(info) => {
                let info = Arc::new(info);
                let now = self.clock.now();
                let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                cache.retain(|_, entry| now.duration_since(entry.fetched_at) < self.ttl);
                cache.insert(
                    key.to_string(),
                    CacheEntry {
                        info: info.clone(),
                        fetched_at: now,
                    },
                );
                info!("Cached company '{key}' ({} entries)", cache.len());
                Ok(info)
            }
            Err(SourceError::QuotaExceeded) => {
                warn!(
                    "Company API quota exceeded; pausing lookups for {}s",
                    self.cooldown.as_secs()
                );
                *self.blocked_until.lock().unwrap_or_else(|e| e.into_inner()) =
                    Some(self.clock.now() + self.cooldown);
                Err(LookupError::CoolingDown {
                    retry_after: self.cooldown,
                })
            }
            Err(SourceError::NotFound(name)) => Err(LookupError::NotFound(name)),
            Err(SourceError::Upstream(msg)) => Err(LookupError::Upstream(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::task::JoinSet;

    use super::*;
    use crate::company::clock::FakeClock;

    struct FakeSource {
        calls: AtomicUsize,
        delay: Duration,
        responses: Mutex<Vec<Result<CompanyInfo, SourceError>>>,
    }

    impl FakeSource {
        fn new(responses: Vec<Result<CompanyInfo, SourceError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(50),
                responses: Mutex::new(responses),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompanySource for FakeSource {
        async fn fetch(&self, name: &str) -> Result<CompanyInfo, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(info(name))
            } else {
                responses.remove(0)
            }
        }
    }

    fn info(name: &str) -> CompanyInfo {
        CompanyInfo {
            name: name.to_string(),
            summary: None,
            industry: None,
            founded_year: None,
            employees: None,
            homepage: None,
            news: Vec::new(),
        }
    }

    fn service(source: Arc<FakeSource>, clock: Arc<FakeClock>) -> Arc<CompanyLookup> {
        Arc::new(CompanyLookup::new(
            source,
            clock,
            DEFAULT_CACHE_TTL,
            DEFAULT_QUOTA_COOLDOWN,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_share_one_request() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let lookup = service(source.clone(), Arc::new(FakeClock::default()));

        let mut set = JoinSet::new();
        for name in ["Naver", "naver", "  NAVER ", "Naver", "naver"] {
            let lookup = lookup.clone();
            set.spawn(async move { lookup.lookup(name).await });
        }
        while let Some(result) = set.join_next().await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_ttl() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let clock = Arc::new(FakeClock::default());
        let lookup = service(source.clone(), clock.clone());

        lookup.lookup("카카오").await.unwrap();
        lookup.lookup("카카오").await.unwrap();
        assert_eq!(source.calls(), 1);

        clock.advance(DEFAULT_CACHE_TTL + Duration::from_secs(1));
        lookup.lookup("카카오").await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_error_closes_gate_until_cooldown() {
        let source = Arc::new(FakeSource::new(vec![Err(SourceError::QuotaExceeded)]));
        let clock = Arc::new(FakeClock::default());
        let lookup = service(source.clone(), clock.clone());

        assert!(matches!(
            lookup.lookup("Toss").await,
            Err(LookupError::CoolingDown { .. })
        ));
        clock.advance(Duration::from_secs(60));
        match lookup.lookup("Line").await {
            Err(LookupError::CoolingDown { retry_after }) => {
                assert_eq!(retry_after, DEFAULT_QUOTA_COOLDOWN - Duration::from_secs(60));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert_eq!(source.calls(), 1);

        clock.advance(DEFAULT_QUOTA_COOLDOWN);
        assert!(lookup.lookup("Line").await.is_ok());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let source = Arc::new(FakeSource::new(vec![
            Err(SourceError::NotFound("없는회사".to_string())),
            Err(SourceError::Upstream("boom".to_string())),
        ]));
        let lookup = service(source.clone(), Arc::new(FakeClock::default()));

        assert_eq!(
            lookup.lookup("없는회사").await,
            Err(LookupError::NotFound("없는회사".to_string()))
        );
        assert!(matches!(lookup.lookup("없는회사").await, Err(LookupError::Upstream(_))));
        assert!(lookup.lookup("없는회사").await.is_ok());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_pruned_on_insert() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let clock = Arc::new(FakeClock::default());
        let lookup = service(source.clone(), clock.clone());

        for name in ["Naver", "Kakao", "Toss"] {
            lookup.lookup(name).await.unwrap();
        }
        assert_eq!(lookup.cache.lock().unwrap().len(), 3);

        clock.advance(DEFAULT_CACHE_TTL);
        lookup.lookup("Line").await.unwrap();
        let cache = lookup.cache.lock().unwrap();
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["line"]);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let lookup = service(source.clone(), Arc::new(FakeClock::default()));
        assert_eq!(lookup.lookup("   ").await, Err(LookupError::EmptyName));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_cache_key_normalizes() {
        assert_eq!(cache_key("  Samsung   Electronics "), "samsung electronics");
    }
}
