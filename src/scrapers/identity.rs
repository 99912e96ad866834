//! Request identity: a fresh header set for every outgoing request.

use rand::{rng, Rng};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Pool of client identities. Each call to [`Identities::headers`] builds a
/// new, owned header map, so concurrent requests never share one.
#[derive(Debug, Clone)]
pub struct Identities {
    user_agents: Vec<HeaderValue>,
}

impl Identities {
    /// Unusable entries (blank or with invalid header bytes) are skipped.
    pub fn new(user_agents: &[String]) -> Self {
        let user_agents = user_agents
            .iter()
            .map(|ua| ua.trim())
            .filter(|ua| !ua.is_empty())
            .filter_map(|ua| HeaderValue::from_str(ua).ok())
            .collect();
        Self { user_agents }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.user_agents.is_empty() {
            let i = rng().random_range(0..self.user_agents.len());
            headers.insert(USER_AGENT, self.user_agents[i].clone());
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers
    }
}
