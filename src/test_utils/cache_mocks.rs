//! Fakes for the cache, rate limiter and password hasher.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    infra::rate_limit::RateLimiterTrait,
    use_cases::{auth::PasswordHasher, listing::KeyValueCache},
};

/// In-memory KeyValueCache. TTLs are recorded, not enforced.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, String>>,
    last_ttl: Mutex<Option<u64>>,
    deletes: AtomicUsize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let cache = Self::default();
        cache.insert(key, value);
        cache
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn last_ttl(&self) -> Option<u64> {
        *self.last_ttl.lock().unwrap()
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()> {
        self.insert(key, value);
        *self.last_ttl.lock().unwrap() = Some(ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Cache whose every operation fails, as when Redis is unreachable.
#[derive(Default)]
pub struct FailingCache;

#[async_trait]
impl KeyValueCache for FailingCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::Internal("cache unavailable".into()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> AppResult<()> {
        Err(AppError::Internal("cache unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::Internal("cache unavailable".into()))
    }
}

/// Per-IP counter without expiry. `permissive()` never limits.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    limit: Option<u64>,
    counts: Mutex<HashMap<String, u64>>,
}

impl InMemoryRateLimiter {
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            counts: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(ip.to_string()).or_insert(0);
        *count += 1;
        match self.limit {
            Some(limit) if *count > limit => Err(AppError::RateLimited),
            _ => Ok(()),
        }
    }
}

/// Reversible "hash" so tests stay fast.
#[derive(Default)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}
