use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::error::{ResolveError, ResolveResult};
use crate::core::http_client::JsonClient;

pub const API: &str = "https://api.test";

/// Scripted client: the first route whose pattern is a substring of the
/// requested URL answers. Unrouted URLs fail as network errors.
#[derive(Default)]
pub struct FakeClient {
    routes: Vec<(String, ResolveResult<Value>)>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, body: Value) -> Self {
        self.routes.push((pattern.to_string(), Ok(body)));
        self
    }

    pub fn fail(mut self, pattern: &str, err: ResolveError) -> Self {
        self.routes.push((pattern.to_string(), Err(err)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(pattern))
            .count()
    }
}

#[async_trait]
impl JsonClient for FakeClient {
    async fn get_json(&self, url: &str) -> ResolveResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(url.to_string());
        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| {
                Err(ResolveError::Network {
                    url: url.to_string(),
                    reason: "unrouted".into(),
                })
            })
    }
}

pub fn qn_route(qn: u32) -> String {
    format!("&qn={}&", qn)
}

pub fn network_error(url: &str) -> ResolveError {
    ResolveError::Network {
        url: url.to_string(),
        reason: "connection reset".into(),
    }
}

pub fn pagelist(pages: &[(u32, u64)]) -> Value {
    let data: Vec<Value> = pages
        .iter()
        .map(|(page, cid)| json!({"page": page, "cid": cid, "part": format!("P{}", page)}))
        .collect();
    json!({"code": 0, "message": "0", "data": data})
}

/// Play-url answer with one part for `qn`.
pub fn playurl(qn: u32, url: &str, size: u64) -> Value {
    json!({
        "code": 0,
        "data": {
            "quality": qn,
            "durl": [{"order": 1, "url": url, "backup_url": null, "size": size}]
        }
    })
}

/// Probe answer advertising `tiers`, served at `served` with no usable URL.
pub fn probe(served: u32, tiers: &[(u32, &str)]) -> Value {
    let formats: Vec<Value> = tiers
        .iter()
        .map(|(qn, label)| json!({"quality": qn, "new_description": label, "format": "mp4"}))
        .collect();
    json!({
        "code": 0,
        "data": {
            "quality": served,
            "support_formats": formats,
            "durl": [{"url": "https://cdn.test/probe.m4s", "size": 1}]
        }
    })
}
