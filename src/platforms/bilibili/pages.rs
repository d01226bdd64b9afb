use std::sync::Arc;

use crate::core::cache::MemoCache;
use crate::core::error::{ResolveError, ResolveResult};
use crate::core::http_client::JsonClient;
use crate::models::media::{PageDescriptor, TrackId};
use crate::platforms::bilibili::api::{self, PageItem};

/// Maps (video, page) to the page's `cid`. The page list of a video is
/// fetched once and reused for as long as the resolver lives.
pub struct TrackResolver {
    client: Arc<dyn JsonClient>,
    api_base: String,
    cache: MemoCache<String, Vec<PageDescriptor>>,
}

impl TrackResolver {
    pub fn new(client: Arc<dyn JsonClient>, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            cache: MemoCache::new(),
        }
    }

    pub async fn resolve_track(&self, video_id: &str, page_number: u32) -> ResolveResult<TrackId> {
        let pages = match self.cache.get(&video_id.to_string()).await {
            Some(pages) => pages,
            None => {
                let pages = self.fetch_pages(video_id, page_number).await?;
                self.cache.insert(video_id.to_string(), pages.clone()).await;
                pages
            }
        };
        select_track(&pages, video_id, page_number)
    }

    pub async fn pages(&self, video_id: &str) -> Option<Vec<PageDescriptor>> {
        self.cache.get(&video_id.to_string()).await
    }

    async fn fetch_pages(&self, video_id: &str, page_number: u32) -> ResolveResult<Vec<PageDescriptor>> {
        let url = api::pagelist_url(&self.api_base, video_id);
        let json = self.client.get_json(&url).await?;
        let envelope = api::decode::<Vec<PageItem>>(&url, json)?;

        if envelope.code != 0 {
            tracing::warn!(
                "[pagelist] {} answered code {}: {}",
                video_id,
                envelope.code,
                envelope.message
            );
        }

        let pages: Vec<PageDescriptor> = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(PageDescriptor::from)
            .collect();

        if pages.is_empty() {
            return Err(ResolveError::NoTrack {
                video_id: video_id.to_string(),
                page: page_number,
            });
        }

        tracing::debug!("[pagelist] {} has {} page(s)", video_id, pages.len());
        Ok(pages)
    }
}

/// Exact page match, else the first page: a too-large page number still
/// resolves to something playable.
pub fn select_track(pages: &[PageDescriptor], video_id: &str, page_number: u32) -> ResolveResult<TrackId> {
    let no_track = || ResolveError::NoTrack {
        video_id: video_id.to_string(),
        page: page_number,
    };

    let chosen = pages
        .iter()
        .find(|p| p.page == page_number)
        .or_else(|| pages.first())
        .ok_or_else(no_track)?;

    if chosen.page != page_number {
        tracing::debug!(
            "[pagelist] {} has no page {}, using page {}",
            video_id,
            page_number,
            chosen.page
        );
    }

    chosen.cid.ok_or_else(no_track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::bilibili::fixtures::{self, FakeClient, API};
    use serde_json::json;

    fn resolver(client: Arc<FakeClient>) -> TrackResolver {
        TrackResolver::new(client, API)
    }

    #[tokio::test]
    async fn exact_page_match() {
        let client = Arc::new(FakeClient::new().route("pagelist", fixtures::pagelist(&[(1, 10), (2, 20)])));
        let cid = resolver(client).resolve_track("BV1test", 2).await.unwrap();
        assert_eq!(cid, 20);
    }

    #[tokio::test]
    async fn missing_page_falls_back_to_first() {
        let client = Arc::new(FakeClient::new().route("pagelist", fixtures::pagelist(&[(1, 10), (2, 20)])));
        let cid = resolver(client).resolve_track("BV1test", 5).await.unwrap();
        assert_eq!(cid, 10);
    }

    #[tokio::test]
    async fn second_lookup_hits_cache() {
        let client = Arc::new(FakeClient::new().route("pagelist", fixtures::pagelist(&[(1, 10), (2, 20)])));
        let r = resolver(client.clone());
        r.resolve_track("BV1test", 1).await.unwrap();
        assert_eq!(client.calls(), 1);
        let cid = r.resolve_track("BV1test", 2).await.unwrap();
        assert_eq!(cid, 20);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn empty_list_is_no_track_and_not_cached() {
        let client = Arc::new(FakeClient::new().route("pagelist", json!({"code": -404, "message": "啥都木有", "data": null})));
        let r = resolver(client.clone());
        let err = r.resolve_track("BV1gone", 3).await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoTrack {
                video_id: "BV1gone".into(),
                page: 3
            }
        );
        assert!(r.pages("BV1gone").await.is_none());
        r.resolve_track("BV1gone", 1).await.unwrap_err();
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn descriptor_without_cid_is_no_track() {
        let client = Arc::new(FakeClient::new().route("pagelist", json!({"code": 0, "data": [{"page": 1}]})));
        let err = resolver(client).resolve_track("BV1nocid", 1).await.unwrap_err();
        assert_eq!(err.kind(), "no_track");
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let client = Arc::new(FakeClient::new().fail("pagelist", ResolveError::Timeout("pagelist".into())));
        let err = resolver(client).resolve_track("BV1slow", 1).await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[tokio::test]
    async fn malformed_data_is_parse_error() {
        let client = Arc::new(FakeClient::new().route("pagelist", json!({"code": 0, "data": {"page": 1}})));
        let err = resolver(client).resolve_track("BV1odd", 1).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
