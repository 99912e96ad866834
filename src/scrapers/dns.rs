//! DNS resolver that reuses lookups for a fixed time-to-live.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hyper::client::connect::dns::Name;
use reqwest::dns::{Addrs, Resolve, Resolving};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedLookup {
    expires_at: Instant,
    addrs: Vec<SocketAddr>,
}

#[derive(Debug, Clone, Default)]
struct DnsCache {
    entries: Arc<Mutex<HashMap<String, CachedLookup>>>,
}

impl DnsCache {
    fn get(&self, host: &str, now: Instant) -> Option<Vec<SocketAddr>> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        match entries.get(host) {
            Some(hit) if hit.expires_at > now => Some(hit.addrs.clone()),
            Some(_) => {
                entries.remove(host);
                None
            }
            None => None,
        }
    }

    fn put(&self, host: String, addrs: Vec<SocketAddr>, expires_at: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(host, CachedLookup { expires_at, addrs });
    }
}

/// Shared by every request of a client; clones share the same cache.
#[derive(Debug, Clone)]
pub struct CachingResolver {
    ttl: Duration,
    cache: DnsCache,
}

impl CachingResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: DnsCache::default(),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(lookup(self.cache.clone(), name.as_str().to_string(), self.ttl))
    }
}

async fn lookup(cache: DnsCache, host: String, ttl: Duration) -> Result<Addrs, BoxError> {
    if let Some(addrs) = cache.get(&host, Instant::now()) {
        debug!("DNS cache hit for {}", host);
        return Ok(Box::new(addrs.into_iter()));
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0)).await?.collect();
    cache.put(host, addrs.clone(), Instant::now() + ttl);
    Ok(Box::new(addrs.into_iter()))
}
