//! Response cache with TTL-based expiration
//!
//! Holds results of read-only tool calls and resource reads so repeated
//! questions from an agent do not hit Vault every time. Entries expire after
//! a per-kind TTL; any successful mutating tool call clears the whole cache.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

/// A cached value with expiration time
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self { value, expires_at: Instant::now() + ttl }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe in-memory cache keyed by tool call or resource URI
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    tool_ttl: Duration,
    resource_ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            tool_ttl: config.tool_ttl(),
            resource_ttl: config.resource_ttl(),
            max_entries: config.max_entries,
        }
    }

    /// Key for a tool call. Arguments are written with object keys sorted at
    /// every level, so equal arguments always produce the same key.
    pub fn tool_key(name: &str, arguments: &Value) -> String {
        let mut key = format!("tool:{}:", name);
        write_canonical(arguments, &mut key);
        key
    }

    pub fn resource_key(uri: &str) -> String {
        format!("resource:{}", uri)
    }

    pub fn get_tool(&self, name: &str, arguments: &Value) -> Option<Value> {
        self.get(&Self::tool_key(name, arguments))
    }

    pub fn put_tool(&self, name: &str, arguments: &Value, value: Value) {
        self.insert(Self::tool_key(name, arguments), value, self.tool_ttl);
    }

    pub fn get_resource(&self, uri: &str) -> Option<Value> {
        self.get(&Self::resource_key(uri))
    }

    pub fn put_resource(&self, uri: &str, value: Value) {
        self.insert(Self::resource_key(uri), value, self.resource_ttl);
    }

    /// Get a cached value, if present and not expired
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    fn insert(&self, key: String, value: Value, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.max_entries {
                entries.retain(|_, entry| !entry.is_expired());
            }

            // Still full: drop the entry closest to expiry
            if entries.len() >= self.max_entries {
                if let Some(oldest) =
                    entries.iter().min_by_key(|(_, v)| v.expires_at).map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }

            entries.insert(key, CacheEntry::new(value, ttl));
        }
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            if !entries.is_empty() {
                tracing::debug!(entries = entries.len(), "Invalidating response cache");
            }
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&str, &Value> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
            out.push('{');
            for (i, (key, value)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
