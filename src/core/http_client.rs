use std::time::Duration;

use async_trait::async_trait;
use bilicopy_core::models::settings::{NetworkSettings, ProxySettings};

use crate::core::error::{ResolveError, ResolveResult};

/// One GET, body parsed as JSON. Implementations never retry and never cache.
#[async_trait]
pub trait JsonClient: Send + Sync {
    async fn get_json(&self, url: &str) -> ResolveResult<serde_json::Value>;
}

pub struct ReqwestJsonClient {
    client: reqwest::Client,
    referer: String,
}

impl ReqwestJsonClient {
    /// Fails when the settings cannot produce a client, e.g. a user agent
    /// that is not a valid header value.
    pub fn new(settings: &NetworkSettings) -> anyhow::Result<Self> {
        let builder = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(15));
        let client = apply_proxy(builder, &settings.proxy).build()?;
        Ok(Self {
            client,
            referer: settings.referer.clone(),
        })
    }
}

#[async_trait]
impl JsonClient for ReqwestJsonClient {
    async fn get_json(&self, url: &str) -> ResolveResult<serde_json::Value> {
        tracing::debug!("[http] GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, &self.referer)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        if !status.is_success() {
            tracing::debug!("[http] {} returned HTTP {}", url, status);
        }

        parse_body(url, &body)
    }
}

/// The API answers errors with a JSON envelope too, so the status code is
/// left for the caller to judge through the envelope's `code`.
pub fn parse_body(url: &str, body: &str) -> ResolveResult<serde_json::Value> {
    serde_json::from_str(body).map_err(|e| ResolveError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn map_transport_error(url: &str, e: reqwest::Error) -> ResolveError {
    if e.is_timeout() {
        ResolveError::Timeout(url.to_string())
    } else {
        ResolveError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

pub fn proxy_url(proxy: &ProxySettings) -> Option<String> {
    if !proxy.enabled || proxy.host.is_empty() {
        return None;
    }
    let scheme = match proxy.proxy_type.as_str() {
        "socks5" => "socks5",
        "https" => "https",
        _ => "http",
    };
    if !proxy.username.is_empty() {
        Some(format!(
            "{}://{}:{}@{}:{}",
            scheme, proxy.username, proxy.password, proxy.host, proxy.port
        ))
    } else {
        Some(format!("{}://{}:{}", scheme, proxy.host, proxy.port))
    }
}

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxySettings,
) -> reqwest::ClientBuilder {
    let Some(url) = proxy_url(proxy) else {
        return builder;
    };
    match reqwest::Proxy::all(&url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}
